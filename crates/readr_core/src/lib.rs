pub mod domain;
pub mod ports;

pub use domain::{
    FileId, FileRecord, Page, Phase, ProcessingState, ProgressEvent, Session, UploadOptions,
    UploadStatus, User, Voice,
};
pub use ports::{
    AssistantEmbed, AuthApi, FileApi, PortError, PortResult, ProgressChannel, ProgressHandler,
    SessionPersistence, SubscriptionHandle,
};
