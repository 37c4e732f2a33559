//! services/client/src/lib.rs
//!
//! Headless client for the ReadrAI backend: session management, the file
//! catalog, uploads with live processing progress over a push channel, and
//! the reading arena.
//!
//! The core domain and port traits live in `readr_core`; this crate holds
//! the adapters (HTTP backend, WebSocket progress channel, on-disk session
//! store) and the application-layer state machines the views drive.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;

pub use config::Config;
pub use error::ClientError;
pub use session::SessionContext;
