//! services/client/src/app/state.rs
//!
//! Defines the application's shared state and the dismissible notice type.

use crate::config::Config;
use crate::session::SessionContext;
use readr_core::ports::{AssistantEmbed, AuthApi, FileApi};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Views)
//=========================================================================================

/// The shared application state, created once at startup and handed to
/// every view. Push-channel connections are deliberately NOT part of this:
/// one is opened per view mount and torn down on unmount.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: SessionContext,
    pub auth_api: Arc<dyn AuthApi>,
    pub file_api: Arc<dyn FileApi>,
    pub embed: Arc<dyn AssistantEmbed>,
}

//=========================================================================================
// Notices
//=========================================================================================

/// A user-visible, dismissible message (the banner/modal of the original
/// UI). Carries the backend's own text when one was provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
