//! crates/readr_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific transports like HTTP or WebSockets.

use crate::domain::{FileId, FileRecord, ProgressEvent, Session, UploadOptions, Voice};
use async_trait::async_trait;
use bytes::Bytes;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (e.g., the HTTP backend or the push channel).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The backend rejected the request and supplied a user-facing message.
    /// This is the text shown in dismissible banners.
    #[error("{0}")]
    Rejected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The two-step email + one-time-code exchange.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Asks the backend to dispatch a one-time code to `email`.
    async fn request_code(&self, email: &str) -> PortResult<()>;

    /// Exchanges a 6-digit code for a token plus user identity.
    async fn verify_code(&self, email: &str, code: &str) -> PortResult<Session>;
}

/// File catalog, upload, and document retrieval.
#[async_trait]
pub trait FileApi: Send + Sync {
    async fn list_files(&self) -> PortResult<Vec<FileRecord>>;

    async fn delete_file(&self, id: &FileId) -> PortResult<()>;

    async fn list_voices(&self) -> PortResult<Vec<Voice>>;

    /// Posts the multipart payload (file, voiceId, temperature, speed) and
    /// returns the identifier the backend assigned to the new file.
    async fn upload(
        &self,
        file_name: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> PortResult<FileId>;

    /// Fetches the full record, including per-page text and audio URLs.
    async fn get_file(&self, id: &FileId) -> PortResult<FileRecord>;

    /// Fetches a short-lived signed URL for viewing the raw document.
    async fn view_url(&self, id: &FileId) -> PortResult<String>;
}

/// Durable client-side storage for the session, so it survives restarts.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> PortResult<Option<Session>>;
    fn save(&self, session: &Session) -> PortResult<()>;
    /// Cleared wholesale on logout.
    fn clear(&self) -> PortResult<()>;
}

/// Callback invoked for every message delivered on a subscribed topic.
pub type ProgressHandler = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// A handle identifying one live topic subscription.
///
/// Dropping the handle does nothing by itself; teardown goes through
/// [`ProgressChannel::unsubscribe`] so callers control exactly when a
/// handler stops firing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub id: u64,
    pub topic: String,
}

/// The asymmetric, fire-and-forget push channel.
///
/// One long-lived connection is shared by all subscriptions; dispatch is
/// keyed by topic name. The backend is the sole producer. Reconnection after
/// a transport-level drop is the channel's own concern, and no replay of
/// missed messages is ever requested.
#[async_trait]
pub trait ProgressChannel: Send + Sync {
    async fn subscribe(&self, topic: &str, handler: ProgressHandler)
        -> PortResult<SubscriptionHandle>;

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> PortResult<()>;
}

/// The third-party conversational-assistant embed.
///
/// Its lifecycle is entirely owned by the vendor widget; the client only
/// starts it with the current page's text and stops it again.
#[async_trait]
pub trait AssistantEmbed: Send + Sync {
    async fn open(&self, page_text: &str) -> PortResult<()>;
    async fn close(&self) -> PortResult<()>;
}
