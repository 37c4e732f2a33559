//! crates/readr_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any wire format or storage; the
//! adapters own the serde-annotated record types and convert into these.

use chrono::{DateTime, Utc};
use std::fmt;

/// An opaque backend identifier for an uploaded file.
///
/// The backend hands these out as strings and the client never inspects
/// their structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(pub String);

impl FileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        FileId(s.to_string())
    }
}

/// The authenticated user as reported by the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// An authenticated session: the bearer token plus the user it belongs to.
///
/// A `Session` existing is what "authenticated" means; there is no separate
/// flag to keep in sync.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

/// One page of a processed document.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub text: String,
    /// Absent while audio synthesis for this page has not finished.
    pub audio_url: Option<String>,
}

/// Server-held metadata and per-page content for an uploaded document.
///
/// The client treats this as a read-mostly cached copy refreshed by
/// re-fetch; the only client-side overlay is the live [`ProcessingState`].
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    pub file_name: String,
    pub processing_complete: bool,
    pub processed_pages: u32,
    pub total_pages: u32,
    pub pages: Vec<Page>,
}

/// A named stage of backend processing surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extraction,
    Audio,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Extraction => f.write_str("extraction"),
            Phase::Audio => f.write_str("audio"),
        }
    }
}

/// A single progress message from the push channel.
///
/// `current` and `total` are monotonically non-decreasing within a phase;
/// the client trusts the phase tag on each message and does not enforce any
/// cross-phase ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub current: u32,
    pub total: u32,
}

impl ProgressEvent {
    /// The one terminal condition the client recognizes: the audio phase
    /// reporting itself fully done. Extraction never completes a file.
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Audio && self.current == self.total
    }

    /// Normalizes the event into a percentage in `[0, 100]`.
    ///
    /// Kept as a float; rounding happens only at display time.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.current) / f64::from(self.total) * 100.0).clamp(0.0, 100.0)
    }
}

/// Ephemeral, in-memory processing status for one file, derived from the
/// latest progress event (or approximated from page counts at initial load).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingState {
    pub phase: Phase,
    pub progress_percent: f64,
}

impl ProcessingState {
    /// Rounded for rendering only; the stored value stays a float.
    pub fn display_percent(&self) -> u32 {
        self.progress_percent.round() as u32
    }
}

/// A synthesis voice offered by the backend.
#[derive(Debug, Clone)]
pub struct Voice {
    pub value: String,
    pub name: String,
    pub gender: String,
    pub style: String,
    pub accent: String,
    /// URL of a short audio sample for previewing the voice.
    pub sample: String,
}

/// Synthesis options collected by the upload form and passed through to the
/// backend verbatim, after input-control clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub voice_id: String,
    pub temperature: f64,
    pub speed: f64,
}

impl UploadOptions {
    pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
    pub const SPEED_RANGE: (f64, f64) = (0.1, 5.0);

    /// Builds options with the numeric knobs clamped to the ranges the
    /// input controls enforce. The semantics of `temperature` belong to the
    /// synthesis backend; the client only clamps.
    pub fn new(voice_id: impl Into<String>, temperature: f64, speed: f64) -> Self {
        let (t_min, t_max) = Self::TEMPERATURE_RANGE;
        let (s_min, s_max) = Self::SPEED_RANGE;
        Self {
            voice_id: voice_id.into(),
            temperature: temperature.clamp(t_min, t_max),
            speed: speed.clamp(s_min, s_max),
        }
    }
}

/// Lifecycle of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Processing,
    Success,
    Error(String),
}
