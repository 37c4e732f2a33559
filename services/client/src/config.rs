//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the backend, e.g. `https://api.readr.example`.
    pub backend_url: String,
    /// WebSocket endpoint for the progress push channel. Derived from
    /// `backend_url` when not given explicitly.
    pub progress_ws_url: String,
    pub log_level: Level,
    /// Where the durable session (token + user) lives between runs.
    pub session_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let backend_url = std::env::var("BACKEND_URL")
            .map_err(|_| ConfigError::MissingVar("BACKEND_URL".to_string()))?;
        let backend_url = backend_url.trim_end_matches('/').to_string();

        let progress_ws_url = match std::env::var("PROGRESS_WS_URL") {
            Ok(url) => url,
            Err(_) => derive_ws_url(&backend_url).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "BACKEND_URL".to_string(),
                    format!("cannot derive a ws:// URL from '{}'", backend_url),
                )
            })?,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let session_path = std::env::var("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.readr/session.json"));

        Ok(Self {
            backend_url,
            progress_ws_url,
            log_level,
            session_path,
        })
    }
}

/// Maps `http(s)://` onto `ws(s)://`, keeping host and path.
fn derive_ws_url(backend_url: &str) -> Option<String> {
    if let Some(rest) = backend_url.strip_prefix("https://") {
        Some(format!("wss://{}", rest))
    } else if let Some(rest) = backend_url.strip_prefix("http://") {
        Some(format!("ws://{}", rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_derivation_follows_the_scheme() {
        assert_eq!(
            derive_ws_url("https://api.readr.example").as_deref(),
            Some("wss://api.readr.example")
        );
        assert_eq!(
            derive_ws_url("http://localhost:4000").as_deref(),
            Some("ws://localhost:4000")
        );
        assert_eq!(derive_ws_url("ftp://nope"), None);
    }
}
