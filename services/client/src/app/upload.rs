//! services/client/src/app/upload.rs
//!
//! Upload submission: candidate validation, synthesis options, and the
//! upload modal's status machine.

use bytes::Bytes;
use readr_core::domain::{FileId, UploadOptions, UploadStatus, Voice};
use readr_core::ports::FileApi;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Fixed ceiling on uploads, enforced before any network call.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// How long the modal lingers on `Success` before handing navigation over
/// to the reading arena.
pub const SUCCESS_NAVIGATION_DELAY: Duration = Duration::from_millis(1500);

/// A file the user dropped or picked, before validation.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl FileCandidate {
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Client-side validation failures, each carrying its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Multi-file drops are rejected outright, never silently truncated.
    #[error("Please upload only one file at a time")]
    MultipleFiles,
    #[error("Only PDF files are allowed")]
    NotPdf,
    #[error("File size must be less than 10MB")]
    TooLarge,
    #[error("No file was provided")]
    NoFile,
}

/// Validates one drag/drop or picker interaction and hands back the single
/// accepted candidate.
pub fn validate_candidates(candidates: &[FileCandidate]) -> Result<&FileCandidate, ValidationError> {
    let candidate = match candidates {
        [] => return Err(ValidationError::NoFile),
        [one] => one,
        _ => return Err(ValidationError::MultipleFiles),
    };

    if !candidate.mime_type.contains("pdf") {
        return Err(ValidationError::NotPdf);
    }
    if candidate.size_bytes() > MAX_FILE_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(candidate)
}

/// The upload modal's state: one validated candidate, the synthesis
/// options, and the `idle -> uploading -> processing -> success | error`
/// lifecycle. An `Error` leaves the form re-editable.
pub struct UploadSession {
    file_api: Arc<dyn FileApi>,
    candidate: FileCandidate,
    voices: Vec<Voice>,
    selected_voice: Option<String>,
    temperature: f64,
    speed: f64,
    status: UploadStatus,
    /// Which voice's sample is currently playing, if any.
    previewing: Option<String>,
    file_id: Option<FileId>,
}

impl UploadSession {
    /// Opens the modal for a candidate that already passed
    /// [`validate_candidates`].
    pub fn new(file_api: Arc<dyn FileApi>, candidate: FileCandidate) -> Self {
        Self {
            file_api,
            candidate,
            voices: Vec::new(),
            selected_voice: None,
            temperature: 1.0,
            speed: 1.0,
            status: UploadStatus::Idle,
            previewing: None,
            file_id: None,
        }
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn file_id(&self) -> Option<&FileId> {
        self.file_id.as_ref()
    }

    /// Fetches the voice list for the form.
    pub async fn load_voices(&mut self) {
        match self.file_api.list_voices().await {
            Ok(voices) => self.voices = voices,
            Err(e) => {
                error!("Failed to fetch voices: {e}");
                self.status =
                    UploadStatus::Error("Failed to load voices. Please try again.".to_string());
            }
        }
    }

    pub fn select_voice(&mut self, voice_id: impl Into<String>) {
        self.selected_voice = Some(voice_id.into());
    }

    /// The input controls clamp; the values pass through to the backend
    /// verbatim afterwards.
    pub fn set_temperature(&mut self, temperature: f64) {
        let (min, max) = UploadOptions::TEMPERATURE_RANGE;
        self.temperature = temperature.clamp(min, max);
    }

    pub fn set_speed(&mut self, speed: f64) {
        let (min, max) = UploadOptions::SPEED_RANGE;
        self.speed = speed.clamp(min, max);
    }

    /// Toggles a voice's sample preview: starting another voice's sample
    /// while one is playing just stops the current one, like the original
    /// form. Returns the sample URL to start playing, if any.
    pub fn toggle_sample(&mut self, voice_id: &str) -> Option<String> {
        if self.previewing.take().is_some() {
            return None;
        }
        let sample = self
            .voices
            .iter()
            .find(|v| v.value == voice_id)
            .map(|v| v.sample.clone())?;
        self.previewing = Some(voice_id.to_string());
        Some(sample)
    }

    pub fn previewing(&self) -> Option<&str> {
        self.previewing.as_deref()
    }

    /// The submit action is enabled only with a voice chosen and the form
    /// idle.
    pub fn submit_enabled(&self) -> bool {
        self.selected_voice.is_some() && self.status == UploadStatus::Idle
    }

    /// Posts the multipart payload. On success the session moves to
    /// `Processing` and hands back the new file id for the caller to open
    /// a single-topic tracker subscription on; on failure it moves to
    /// `Error` with the backend's message and stays re-editable.
    pub async fn submit(&mut self) -> Option<FileId> {
        let Some(voice_id) = self.selected_voice.clone() else {
            return None;
        };
        if self.status != UploadStatus::Idle {
            return None;
        }

        // Any playing sample stops when the upload starts.
        self.previewing = None;
        self.status = UploadStatus::Uploading;

        let options = UploadOptions::new(voice_id, self.temperature, self.speed);
        match self
            .file_api
            .upload(&self.candidate.name, self.candidate.data.clone(), &options)
            .await
        {
            Ok(file_id) => {
                self.status = UploadStatus::Processing;
                self.file_id = Some(file_id.clone());
                Some(file_id)
            }
            Err(e) => {
                error!("Upload error: {e}");
                self.status = UploadStatus::Error(e.to_string());
                None
            }
        }
    }

    /// Called when the tracker observes the terminal progress event for the
    /// uploaded file: flips to `Success`, waits the fixed delay, and hands
    /// the file id back for navigation into the reading arena.
    pub async fn success_handoff(&mut self) -> Option<FileId> {
        let file_id = self.file_id.clone()?;
        self.status = UploadStatus::Success;
        tokio::time::sleep(SUCCESS_NAVIGATION_DELAY).await;
        Some(file_id)
    }

    /// An errored form goes back to editable.
    pub fn reset_error(&mut self) {
        if matches!(self.status, UploadStatus::Error(_)) {
            self.status = UploadStatus::Idle;
        }
    }
}
