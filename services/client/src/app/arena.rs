//! services/client/src/app/arena.rs
//!
//! The reading arena: page navigation, per-page audio playback, zoom, and
//! the embedded assistant's lifecycle.

use readr_core::domain::{FileId, FileRecord};
use readr_core::ports::{AssistantEmbed, FileApi, PortResult};
use std::sync::Arc;
use tracing::warn;

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.2;

//=============================================================================
// Page audio
//=============================================================================

/// Playback state for the current page's audio element.
///
/// While the user is dragging the seek bar, the drag position is
/// authoritative and element time updates are ignored; the seek commits on
/// release.
#[derive(Debug, Default)]
pub struct PagePlayer {
    is_playing: bool,
    progress_percent: f64,
    dragging: bool,
}

impl PagePlayer {
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// Play/pause toggle. Pages without audio yet have no control to press.
    pub fn toggle(&mut self, has_audio: bool) {
        if has_audio {
            self.is_playing = !self.is_playing;
        }
    }

    /// Element time update: current position and duration in seconds.
    pub fn time_update(&mut self, current: f64, duration: f64) {
        if self.dragging || duration <= 0.0 {
            return;
        }
        self.progress_percent = (current / duration * 100.0).clamp(0.0, 100.0);
    }

    pub fn seek_start(&mut self) {
        self.dragging = true;
    }

    pub fn seek_to(&mut self, percent: f64) {
        if self.dragging {
            self.progress_percent = percent.clamp(0.0, 100.0);
        }
    }

    /// Commits the drag: returns the percentage the element should seek to.
    pub fn seek_end(&mut self) -> f64 {
        self.dragging = false;
        self.progress_percent
    }

    /// Page change or teardown: pause and rewind.
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.progress_percent = 0.0;
        self.dragging = false;
    }

    /// The element finished the track.
    pub fn ended(&mut self) {
        self.reset();
    }
}

//=============================================================================
// Arena
//=============================================================================

/// One open document: the fetched record, a signed view URL for the PDF
/// itself, a 1-based current page, zoom, and the page player.
pub struct Arena {
    embed: Arc<dyn AssistantEmbed>,
    file: FileRecord,
    view_url: String,
    current_page: u32,
    zoom: f64,
    pub player: PagePlayer,
}

impl Arena {
    /// Fetches the document and its signed view URL together and opens the
    /// arena on page 1, seeding the assistant with that page's text.
    pub async fn open(
        file_api: &Arc<dyn FileApi>,
        embed: Arc<dyn AssistantEmbed>,
        id: &FileId,
    ) -> PortResult<Arena> {
        let (file, view_url) = tokio::try_join!(file_api.get_file(id), file_api.view_url(id))?;
        let arena = Arena {
            embed,
            file,
            view_url,
            current_page: 1,
            zoom: 1.0,
            player: PagePlayer::default(),
        };
        arena.reseed_embed().await;
        Ok(arena)
    }

    pub fn file(&self) -> &FileRecord {
        &self.file
    }

    pub fn view_url(&self) -> &str {
        &self.view_url
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.file.pages.len() as u32
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    fn page_index(&self) -> usize {
        (self.current_page - 1) as usize
    }

    pub fn current_page_text(&self) -> &str {
        self.file
            .pages
            .get(self.page_index())
            .map(|p| p.text.as_str())
            .unwrap_or("")
    }

    /// Audio URL for the current page, absent until synthesis reaches it.
    pub fn current_audio_url(&self) -> Option<&str> {
        self.file
            .pages
            .get(self.page_index())
            .and_then(|p| p.audio_url.as_deref())
    }

    /// Jumps to a 1-based page. Out-of-range targets are ignored. Any
    /// playing audio pauses and rewinds, and the assistant is reseeded with
    /// the new page's text.
    pub async fn go_to(&mut self, page: u32) {
        if page == 0 || page > self.page_count() || page == self.current_page {
            return;
        }
        self.current_page = page;
        self.player.reset();
        self.reseed_embed().await;
    }

    pub async fn next_page(&mut self) {
        self.go_to(self.current_page + 1).await;
    }

    pub async fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.go_to(self.current_page - 1).await;
        }
    }

    /// The current page's audio finished: advance automatically, a no-op on
    /// the last page.
    pub async fn audio_ended(&mut self) {
        self.player.ended();
        if self.current_page < self.page_count() {
            self.next_page().await;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Arrow keys page, +/- zoom.
    pub async fn handle_key(&mut self, key: &str) {
        match key {
            "ArrowRight" => self.next_page().await,
            "ArrowLeft" => self.prev_page().await,
            "+" => self.zoom_in(),
            "-" => self.zoom_out(),
            _ => {}
        }
    }

    async fn reseed_embed(&self) {
        if let Err(e) = self.embed.close().await {
            warn!("Could not close assistant embed: {e}");
        }
        if let Err(e) = self.embed.open(self.current_page_text()).await {
            warn!("Could not open assistant embed: {e}");
        }
    }

    /// Leaving the arena closes the assistant and stops playback.
    pub async fn close(&mut self) {
        self.player.reset();
        if let Err(e) = self.embed.close().await {
            warn!("Could not close assistant embed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LoggingEmbed;
    use crate::app::test_support::FakeFileApi;
    use readr_core::domain::Page;

    fn three_page_api() -> Arc<dyn FileApi> {
        let api = FakeFileApi::default();
        *api.file.lock().unwrap() = Some(FileRecord {
            id: FileId::from("f1"),
            file_name: "book.pdf".to_string(),
            processing_complete: false,
            processed_pages: 2,
            total_pages: 3,
            pages: vec![
                Page {
                    text: "page one".to_string(),
                    audio_url: Some("https://cdn/p1.mp3".to_string()),
                },
                Page {
                    text: "page two".to_string(),
                    audio_url: Some("https://cdn/p2.mp3".to_string()),
                },
                Page {
                    text: "page three".to_string(),
                    audio_url: None,
                },
            ],
        });
        Arc::new(api)
    }

    async fn open_arena() -> Arena {
        Arena::open(
            &three_page_api(),
            Arc::new(LoggingEmbed::default()),
            &FileId::from("f1"),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn opens_on_page_one_with_its_audio() {
        let arena = open_arena().await;
        assert_eq!(arena.current_page(), 1);
        assert_eq!(arena.current_page_text(), "page one");
        assert_eq!(arena.current_audio_url(), Some("https://cdn/p1.mp3"));
        assert_eq!(arena.view_url(), "https://signed.example/f1");
    }

    #[tokio::test]
    async fn page_change_pauses_and_rewinds_audio() {
        let mut arena = open_arena().await;
        arena.go_to(2).await;
        arena.player.toggle(true);
        arena.player.time_update(42.0, 100.0);
        assert!(arena.player.is_playing());

        arena.go_to(3).await;
        assert!(!arena.player.is_playing());
        assert_eq!(arena.player.progress_percent(), 0.0);
        // Page 3 has no audio yet, so the toggle is inert.
        arena.player.toggle(arena.current_audio_url().is_some());
        assert!(!arena.player.is_playing());
    }

    #[tokio::test]
    async fn out_of_range_jumps_are_ignored() {
        let mut arena = open_arena().await;
        arena.go_to(0).await;
        assert_eq!(arena.current_page(), 1);
        arena.go_to(4).await;
        assert_eq!(arena.current_page(), 1);
        arena.prev_page().await;
        assert_eq!(arena.current_page(), 1);
    }

    #[tokio::test]
    async fn ended_audio_advances_except_on_the_last_page() {
        let mut arena = open_arena().await;
        arena.audio_ended().await;
        assert_eq!(arena.current_page(), 2);

        arena.go_to(3).await;
        arena.audio_ended().await;
        assert_eq!(arena.current_page(), 3);
    }

    #[tokio::test]
    async fn zoom_steps_are_clamped() {
        let mut arena = open_arena().await;
        for _ in 0..10 {
            arena.zoom_in();
        }
        assert_eq!(arena.zoom(), ZOOM_MAX);
        for _ in 0..20 {
            arena.zoom_out();
        }
        assert_eq!(arena.zoom(), ZOOM_MIN);
    }

    #[tokio::test]
    async fn drag_position_is_authoritative_until_release() {
        let mut player = PagePlayer::default();
        player.time_update(10.0, 100.0);
        player.seek_start();
        player.seek_to(55.0);
        // Element updates during the drag are ignored.
        player.time_update(12.0, 100.0);
        assert_eq!(player.progress_percent(), 55.0);
        assert_eq!(player.seek_end(), 55.0);
        // After release the element position resumes driving.
        player.time_update(56.0, 100.0);
        assert_eq!(player.progress_percent(), 56.0);

        // A zero duration (metadata not yet loaded) never divides.
        player.time_update(1.0, 0.0);
        assert_eq!(player.progress_percent(), 56.0);
    }
}
