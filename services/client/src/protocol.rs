//! services/client/src/protocol.rs
//!
//! Defines the push-channel message protocol between this client and the
//! backend's progress notifier. The channel is asymmetric and fire-and-forget:
//! the backend is the sole producer of progress events; the client only
//! manages topic subscriptions.

use readr_core::domain::{FileId, Phase, ProgressEvent};
use serde::{Deserialize, Serialize};

/// Builds the deterministic, per-subject topic name scoping progress
/// messages to one user+file pair.
pub fn progress_topic(user_email: &str, file_id: &FileId) -> String {
    format!("pdf-progress-{}-{}", user_email, file_id)
}

//=========================================================================================
// Messages Sent FROM the Client TO the Backend
//=========================================================================================

/// Represents the structured text messages this client can send on the
/// push channel. Subscriptions are the only thing the client ever says.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
}

//=========================================================================================
// Messages Sent FROM the Backend TO the Client
//=========================================================================================

/// One frame from the backend: a topic name plus the progress event carried
/// on it. There is no error/failure frame; a stalled phase is only visible
/// as the absence of further frames.
#[derive(Deserialize, Debug, Clone)]
pub struct ServerFrame {
    pub topic: String,
    pub event: ProgressEventWire,
}

/// The `{phase, current, total}` payload as it appears on the wire.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEventWire {
    pub phase: PhaseWire,
    pub current: u32,
    pub total: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseWire {
    Extraction,
    Audio,
}

impl ProgressEventWire {
    pub fn to_domain(self) -> ProgressEvent {
        ProgressEvent {
            phase: match self.phase {
                PhaseWire::Extraction => Phase::Extraction,
                PhaseWire::Audio => Phase::Audio,
            },
            current: self.current,
            total: self.total,
        }
    }
}
