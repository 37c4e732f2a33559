//! services/client/src/app/catalog.rs
//!
//! The file catalog behind the Dashboard: the user's uploaded documents,
//! plus the live processing overlay for anything still being worked on.

use crate::app::state::Notice;
use crate::app::tracker::ProgressTracker;
use readr_core::domain::{FileId, FileRecord};
use readr_core::ports::FileApi;
use std::sync::Arc;
use tracing::error;

/// Read-mostly cached copy of the user's `FileRecord`s, refreshed by
/// re-fetch. There is no partial-failure merge: a failed refresh leaves the
/// prior list untouched and raises a dismissible notice.
pub struct Catalog {
    file_api: Arc<dyn FileApi>,
    files: Vec<FileRecord>,
    notice: Option<Notice>,
}

impl Catalog {
    pub fn new(file_api: Arc<dyn FileApi>) -> Self {
        Self {
            file_api,
            files: Vec::new(),
            notice: None,
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Fetches the full listing and rebuilds the tracker's processing
    /// overlay from it. Returns whether the refresh succeeded.
    pub async fn refresh(&mut self, tracker: &ProgressTracker) -> bool {
        match self.file_api.list_files().await {
            Ok(files) => {
                self.files = files;
                tracker.seed(&self.files);
                true
            }
            Err(e) => {
                error!("Error fetching files: {e}");
                self.notice = Some(Notice::new("Failed to load files"));
                false
            }
        }
    }

    /// Deletes one record, then re-fetches. On failure the list stays stale
    /// until the next successful refresh; there is no optimistic rollback.
    pub async fn delete(&mut self, id: &FileId, tracker: &ProgressTracker) {
        match self.file_api.delete_file(id).await {
            Ok(()) => {
                self.refresh(tracker).await;
            }
            Err(e) => {
                error!("Error deleting file {id}: {e}");
                self.notice = Some(Notice::new("Failed to delete file"));
            }
        }
    }
}
