//! services/client/src/app/mod.rs
//!
//! The application layer: one module per view-facing state machine. These
//! hold the client-side state the original UI owned, behind narrow methods,
//! and talk to the backend only through the core ports.

pub mod arena;
pub mod auth_flow;
pub mod catalog;
pub mod router;
pub mod state;
pub mod tracker;
pub mod upload;

pub use state::{AppState, Notice};
pub use tracker::ProgressTracker;

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared in-memory fakes for the port traits, used across the app
    //! modules' test suites.

    use async_trait::async_trait;
    use bytes::Bytes;
    use readr_core::domain::{
        FileId, FileRecord, ProgressEvent, Session, UploadOptions, User, Voice,
    };
    use readr_core::ports::{
        AuthApi, FileApi, PortError, PortResult, ProgressChannel, ProgressHandler,
        SubscriptionHandle,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::sync::Mutex;

    pub fn record(id: &str, complete: bool, processed: u32, total: u32) -> FileRecord {
        FileRecord {
            id: FileId::from(id),
            file_name: format!("{id}.pdf"),
            processing_complete: complete,
            processed_pages: processed,
            total_pages: total,
            pages: Vec::new(),
        }
    }

    pub fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user: User {
                id: "u1".to_string(),
                email: "reader@example.com".to_string(),
            },
            logged_in_at: chrono::Utc::now(),
        }
    }

    /// Scripted `FileApi`: serves canned listings and records calls.
    pub struct FakeFileApi {
        pub listings: Mutex<Vec<PortResult<Vec<FileRecord>>>>,
        pub voices: Mutex<PortResult<Vec<Voice>>>,
        pub upload_result: Mutex<Option<PortResult<FileId>>>,
        pub deleted: Mutex<Vec<FileId>>,
        pub uploads: Mutex<Vec<(String, UploadOptions)>>,
        pub list_calls: AtomicU32,
        /// Served by `get_file` when set.
        pub file: Mutex<Option<FileRecord>>,
    }

    impl Default for FakeFileApi {
        fn default() -> Self {
            Self {
                listings: Mutex::new(Vec::new()),
                voices: Mutex::new(Ok(Vec::new())),
                upload_result: Mutex::new(None),
                deleted: Mutex::new(Vec::new()),
                uploads: Mutex::new(Vec::new()),
                list_calls: AtomicU32::new(0),
                file: Mutex::new(None),
            }
        }
    }

    impl FakeFileApi {
        pub fn with_listings(listings: Vec<PortResult<Vec<FileRecord>>>) -> Self {
            Self {
                listings: Mutex::new(listings),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl FileApi for FakeFileApi {
        async fn list_files(&self) -> PortResult<Vec<FileRecord>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let mut listings = self.listings.lock().unwrap();
            if listings.is_empty() {
                Ok(Vec::new())
            } else {
                listings.remove(0)
            }
        }

        async fn delete_file(&self, id: &FileId) -> PortResult<()> {
            self.deleted.lock().unwrap().push(id.clone());
            Ok(())
        }

        async fn list_voices(&self) -> PortResult<Vec<Voice>> {
            match &*self.voices.lock().unwrap() {
                Ok(voices) => Ok(voices.clone()),
                Err(e) => Err(PortError::Rejected(e.to_string())),
            }
        }

        async fn upload(
            &self,
            file_name: &str,
            _data: Bytes,
            options: &UploadOptions,
        ) -> PortResult<FileId> {
            self.uploads
                .lock()
                .unwrap()
                .push((file_name.to_string(), options.clone()));
            self.upload_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(FileId::from("uploaded")))
        }

        async fn get_file(&self, id: &FileId) -> PortResult<FileRecord> {
            match self.file.lock().unwrap().clone() {
                Some(file) => Ok(file),
                None => Ok(record(id.as_str(), true, 0, 0)),
            }
        }

        async fn view_url(&self, id: &FileId) -> PortResult<String> {
            Ok(format!("https://signed.example/{id}"))
        }
    }

    /// Scripted `AuthApi`.
    pub struct FakeAuthApi {
        pub request_result: Mutex<PortResult<()>>,
        pub verify_result: Mutex<Option<PortResult<Session>>>,
    }

    impl Default for FakeAuthApi {
        fn default() -> Self {
            Self {
                request_result: Mutex::new(Ok(())),
                verify_result: Mutex::new(Some(Ok(session()))),
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn request_code(&self, _email: &str) -> PortResult<()> {
            match &*self.request_result.lock().unwrap() {
                Ok(()) => Ok(()),
                Err(e) => Err(PortError::Rejected(e.to_string())),
            }
        }

        async fn verify_code(&self, _email: &str, _code: &str) -> PortResult<Session> {
            self.verify_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(session()))
        }
    }

    /// In-memory `ProgressChannel`: tests push events straight into the
    /// registered handlers.
    #[derive(Default)]
    pub struct FakeChannel {
        handlers: Mutex<HashMap<String, Vec<(u64, ProgressHandler)>>>,
        next_id: AtomicU64,
        pub unsubscribed: Mutex<Vec<String>>,
    }

    impl FakeChannel {
        pub fn emit(&self, topic: &str, event: ProgressEvent) {
            if let Some(handlers) = self.handlers.lock().unwrap().get(topic) {
                for (_, handler) in handlers {
                    handler(event);
                }
            }
        }

        pub fn topics(&self) -> Vec<String> {
            self.handlers.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl ProgressChannel for FakeChannel {
        async fn subscribe(
            &self,
            topic: &str,
            handler: ProgressHandler,
        ) -> PortResult<SubscriptionHandle> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.handlers
                .lock()
                .unwrap()
                .entry(topic.to_string())
                .or_default()
                .push((id, handler));
            Ok(SubscriptionHandle {
                id,
                topic: topic.to_string(),
            })
        }

        async fn unsubscribe(&self, handle: &SubscriptionHandle) -> PortResult<()> {
            self.unsubscribed.lock().unwrap().push(handle.topic.clone());
            if let Some(entry) = self.handlers.lock().unwrap().get_mut(&handle.topic) {
                entry.retain(|(id, _)| *id != handle.id);
            }
            Ok(())
        }
    }
}
