//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client service.

use crate::config::ConfigError;
use readr_core::ports::PortError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying HTTP client library.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents an error related to the push-channel WebSocket connection.
    #[error("WebSocket Error: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Represents a standard Input/Output error (e.g., reading the session file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a JSON (de)serialization failure.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
