pub mod embed;
pub mod http;
pub mod progress_ws;
pub mod session_file;

pub use embed::LoggingEmbed;
pub use http::BackendHttp;
pub use progress_ws::WsProgressChannel;
pub use session_file::FileSessionStore;
