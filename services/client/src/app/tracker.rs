//! services/client/src/app/tracker.rs
//!
//! The progress tracker: maps push-channel phase/fraction events into the
//! per-file `ProcessingState` the views render.
//!
//! Per tracked file the state machine is
//! `unstarted -> extraction(p%) -> audio(p%) -> complete`; entry is implicit
//! on the first observed message, and `complete` is recognized only on
//! `phase == audio && current == total`. Every message overwrites phase and
//! percentage atomically (last-write-wins, no coalescing); there is no
//! timeout or alarm for a stalled phase.

use crate::protocol::progress_topic;
use readr_core::domain::{FileId, FileRecord, Phase, ProcessingState, ProgressEvent};
use readr_core::ports::{PortResult, ProgressChannel, SubscriptionHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type StateMap = Arc<Mutex<HashMap<FileId, ProcessingState>>>;

/// Applies one event to the live map: a single atomic overwrite.
fn apply_event(states: &StateMap, file_id: &FileId, event: ProgressEvent) {
    let next = ProcessingState {
        phase: event.phase,
        progress_percent: event.percent(),
    };
    states
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(file_id.clone(), next);
}

/// Tracks processing progress for one view's worth of files.
///
/// The Dashboard variant calls [`ProgressTracker::track_catalog`] to fan out
/// over every incomplete file; the Upload variant calls
/// [`ProgressTracker::track`] for exactly the file it just created. Either
/// way the tracker is torn down with the view.
pub struct ProgressTracker {
    channel: Arc<dyn ProgressChannel>,
    states: StateMap,
    completions: mpsc::UnboundedSender<FileId>,
    cancel: CancellationToken,
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl ProgressTracker {
    /// Builds a tracker over the given channel. The returned receiver
    /// yields each file id whose terminal event has been observed; the
    /// Dashboard answers it with a catalog re-fetch, the Upload modal with
    /// its success transition.
    pub fn new(channel: Arc<dyn ProgressChannel>) -> (Self, mpsc::UnboundedReceiver<FileId>) {
        let (completions, completions_rx) = mpsc::unbounded_channel();
        (
            Self {
                channel,
                states: Arc::new(Mutex::new(HashMap::new())),
                completions,
                cancel: CancellationToken::new(),
                handles: Mutex::new(Vec::new()),
            },
            completions_rx,
        )
    }

    /// Rebuilds the overlay from a fresh catalog listing: every record not
    /// yet complete starts at `extraction` with `processedPages/totalPages`,
    /// until a push event supersedes it. Records reporting
    /// `processing_complete` drop out of the live map here.
    pub fn seed(&self, files: &[FileRecord]) {
        let mut seeded = HashMap::new();
        for file in files {
            if !file.processing_complete {
                let approx = ProgressEvent {
                    phase: Phase::Extraction,
                    current: file.processed_pages,
                    total: file.total_pages,
                };
                seeded.insert(
                    file.id.clone(),
                    ProcessingState {
                        phase: Phase::Extraction,
                        progress_percent: approx.percent(),
                    },
                );
            }
        }
        *self.states.lock().unwrap_or_else(|e| e.into_inner()) = seeded;
    }

    /// Subscribes to the per-subject topic for one file. The handler is a
    /// cancellation-guarded no-op once the tracker is torn down, so a late
    /// event can never write into a dead view.
    pub async fn track(&self, user_email: &str, file_id: &FileId) -> PortResult<()> {
        let topic = progress_topic(user_email, file_id);
        let states = self.states.clone();
        let completions = self.completions.clone();
        let cancel = self.cancel.clone();
        let tracked = file_id.clone();

        let handle = self
            .channel
            .subscribe(
                &topic,
                Box::new(move |event| {
                    if cancel.is_cancelled() {
                        return;
                    }
                    apply_event(&states, &tracked, event);
                    if event.is_terminal() {
                        debug!("File {tracked} finished processing");
                        let _ = completions.send(tracked.clone());
                    }
                }),
            )
            .await?;

        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle);
        Ok(())
    }

    /// Dashboard fan-out: one topic per incomplete file, all over the one
    /// shared connection.
    pub async fn track_catalog(&self, user_email: &str, files: &[FileRecord]) -> PortResult<()> {
        for file in files {
            if !file.processing_complete {
                self.track(user_email, &file.id).await?;
            }
        }
        Ok(())
    }

    /// The latest known state for a file, if it is still processing.
    pub fn state_of(&self, file_id: &FileId) -> Option<ProcessingState> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(file_id)
            .copied()
    }

    /// View unmount: guard the handlers, then drop the server-side topics.
    pub async fn teardown(&self) {
        self.cancel.cancel();
        let handles = std::mem::take(&mut *self.handles.lock().unwrap_or_else(|e| e.into_inner()));
        for handle in handles {
            let _ = self.channel.unsubscribe(&handle).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{record, FakeChannel};

    fn tracker() -> (
        Arc<FakeChannel>,
        ProgressTracker,
        mpsc::UnboundedReceiver<FileId>,
    ) {
        let channel = Arc::new(FakeChannel::default());
        let (tracker, completions) = ProgressTracker::new(channel.clone());
        (channel, tracker, completions)
    }

    fn event(phase: Phase, current: u32, total: u32) -> ProgressEvent {
        ProgressEvent {
            phase,
            current,
            total,
        }
    }

    #[tokio::test]
    async fn normalizes_events_into_percentages() {
        let (channel, tracker, _rx) = tracker();
        let id = FileId::from("a");
        tracker.track("reader@example.com", &id).await.unwrap();

        channel.emit("pdf-progress-reader@example.com-a", event(Phase::Extraction, 3, 10));
        let state = tracker.state_of(&id).unwrap();
        assert_eq!(state.phase, Phase::Extraction);
        assert!((state.progress_percent - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn visible_state_is_last_write_wins() {
        let (channel, tracker, _rx) = tracker();
        let id = FileId::from("a");
        let topic = "pdf-progress-reader@example.com-a";
        tracker.track("reader@example.com", &id).await.unwrap();

        channel.emit(topic, event(Phase::Extraction, 9, 10));
        channel.emit(topic, event(Phase::Audio, 1, 10));
        // Out-of-real-time-order delivery is not reconciled by timestamp.
        channel.emit(topic, event(Phase::Extraction, 2, 10));

        let state = tracker.state_of(&id).unwrap();
        assert_eq!(state.phase, Phase::Extraction);
        assert!((state.progress_percent - 20.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn terminal_fires_only_for_finished_audio() {
        let (channel, tracker, mut completions) = tracker();
        let id = FileId::from("a");
        let topic = "pdf-progress-reader@example.com-a";
        tracker.track("reader@example.com", &id).await.unwrap();

        channel.emit(topic, event(Phase::Extraction, 10, 10));
        assert!(completions.try_recv().is_err());

        channel.emit(topic, event(Phase::Audio, 5, 5));
        assert_eq!(completions.try_recv().unwrap(), id);
    }

    #[tokio::test]
    async fn seeding_approximates_extraction_from_page_counts() {
        let (_, tracker, _rx) = tracker();
        tracker.seed(&[
            record("a", false, 3, 10),
            record("b", true, 10, 10),
            record("c", false, 0, 0),
        ]);

        let a = tracker.state_of(&FileId::from("a")).unwrap();
        assert_eq!(a.phase, Phase::Extraction);
        assert!((a.progress_percent - 30.0).abs() < f64::EPSILON);

        // Complete records carry no live state.
        assert!(tracker.state_of(&FileId::from("b")).is_none());
        // A record with no reported pages starts at zero rather than NaN.
        assert_eq!(tracker.state_of(&FileId::from("c")).unwrap().progress_percent, 0.0);
    }

    #[tokio::test]
    async fn catalog_fan_out_skips_complete_files() {
        let (channel, tracker, _rx) = tracker();
        let files = [record("a", false, 0, 10), record("b", true, 10, 10)];
        tracker
            .track_catalog("reader@example.com", &files)
            .await
            .unwrap();

        let topics = channel.topics();
        assert_eq!(topics, vec!["pdf-progress-reader@example.com-a".to_string()]);
    }

    #[tokio::test]
    async fn torn_down_handlers_are_no_ops() {
        let (channel, tracker, mut completions) = tracker();
        let id = FileId::from("a");
        let topic = "pdf-progress-reader@example.com-a";
        tracker.track("reader@example.com", &id).await.unwrap();
        tracker.teardown().await;

        channel.emit(topic, event(Phase::Audio, 5, 5));
        assert!(tracker.state_of(&id).is_none());
        assert!(completions.try_recv().is_err());
        assert_eq!(channel.unsubscribed.lock().unwrap().len(), 1);
    }
}
