//! services/client/src/adapters/embed.rs
//!
//! The conversational-assistant embed is a third-party widget whose
//! lifecycle the client only starts and stops. This adapter is the
//! headless stand-in: it records the lifecycle in the log and otherwise
//! leaves the widget entirely to the vendor runtime.

use async_trait::async_trait;
use readr_core::ports::{AssistantEmbed, PortResult};
use tracing::info;

#[derive(Default)]
pub struct LoggingEmbed;

#[async_trait]
impl AssistantEmbed for LoggingEmbed {
    async fn open(&self, page_text: &str) -> PortResult<()> {
        info!(
            "Assistant embed opened, seeded with {} chars of page text",
            page_text.len()
        );
        Ok(())
    }

    async fn close(&self) -> PortResult<()> {
        info!("Assistant embed closed");
        Ok(())
    }
}
