//! services/client/src/adapters/progress_ws.rs
//!
//! The WebSocket transport behind the `ProgressChannel` port: one long-lived
//! connection shared by every topic subscription, with handler dispatch
//! keyed by topic name.
//!
//! Connection errors are logged only and never surfaced to the user; the UI
//! simply stops receiving updates until the loop reconnects. No replay of
//! missed messages is requested after a reconnect.

use crate::protocol::{ClientFrame, ServerFrame};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use readr_core::domain::ProgressEvent;
use readr_core::ports::{PortError, PortResult, ProgressChannel, ProgressHandler, SubscriptionHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

//=========================================================================================
// Topic Registry
//=========================================================================================

/// The live subscriptions: topic name -> registered handlers.
pub(crate) struct Registry {
    subscriptions: Mutex<HashMap<String, Vec<(u64, ProgressHandler)>>>,
    next_id: AtomicU64,
}

impl Registry {
    fn new() -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a handler; returns the handle and whether the topic is new
    /// on this connection (and so needs a subscribe frame).
    fn insert(&self, topic: &str, handler: ProgressHandler) -> (SubscriptionHandle, bool) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        let entry = subs.entry(topic.to_string()).or_default();
        let is_new_topic = entry.is_empty();
        entry.push((id, handler));
        (
            SubscriptionHandle {
                id,
                topic: topic.to_string(),
            },
            is_new_topic,
        )
    }

    /// Removes one handler; returns true when the topic has no handlers
    /// left and can be dropped server-side.
    fn remove(&self, handle: &SubscriptionHandle) -> bool {
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = subs.get_mut(&handle.topic) {
            entry.retain(|(id, _)| *id != handle.id);
            if entry.is_empty() {
                subs.remove(&handle.topic);
                return true;
            }
        }
        false
    }

    /// Fans one event out to every handler on its topic. Unknown topics are
    /// silently ignored; the backend may still be emitting for a file whose
    /// view has been torn down.
    fn dispatch(&self, topic: &str, event: ProgressEvent) {
        let subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handlers) = subs.get(topic) {
            for (_, handler) in handlers {
                handler(event);
            }
        }
    }

    fn topics(&self) -> Vec<String> {
        let subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.keys().cloned().collect()
    }
}

//=========================================================================================
// The Channel Adapter
//=========================================================================================

/// `ProgressChannel` over a WebSocket.
///
/// One of these is opened per view mount (Dashboard, Upload modal) and torn
/// down on unmount via [`WsProgressChannel::shutdown`].
pub struct WsProgressChannel {
    registry: Arc<Registry>,
    outgoing: mpsc::UnboundedSender<ClientFrame>,
    shutdown: CancellationToken,
}

impl WsProgressChannel {
    /// Spawns the connection task and returns the shared handle. The task
    /// owns the socket; callers only ever touch the registry and the
    /// outgoing frame queue.
    pub fn connect(ws_url: impl Into<String>) -> Self {
        let registry = Arc::new(Registry::new());
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        tokio::spawn(run_connection(
            ws_url.into(),
            registry.clone(),
            outgoing_rx,
            shutdown.clone(),
        ));

        Self {
            registry,
            outgoing,
            shutdown,
        }
    }

    /// Severs the connection. Registered handlers stop firing immediately;
    /// in-flight HTTP requests elsewhere are unaffected.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for WsProgressChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl ProgressChannel for WsProgressChannel {
    async fn subscribe(
        &self,
        topic: &str,
        handler: ProgressHandler,
    ) -> PortResult<SubscriptionHandle> {
        let (handle, is_new_topic) = self.registry.insert(topic, handler);
        if is_new_topic {
            self.outgoing
                .send(ClientFrame::Subscribe {
                    topic: topic.to_string(),
                })
                .map_err(|_| PortError::Unexpected("progress channel closed".to_string()))?;
        }
        debug!("Subscribed to {topic}");
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> PortResult<()> {
        if self.registry.remove(handle) {
            // Last handler for the topic; tell the backend to stop. A send
            // failure here only means the connection is already gone.
            let _ = self.outgoing.send(ClientFrame::Unsubscribe {
                topic: handle.topic.clone(),
            });
        }
        Ok(())
    }
}

//=========================================================================================
// Connection Task
//=========================================================================================

/// Owns the socket for its whole life: connect, resubscribe, pump frames,
/// and on any transport error retry after a fixed delay. Exponential
/// backoff is deliberately not implemented at this layer.
async fn run_connection(
    ws_url: String,
    registry: Arc<Registry>,
    mut outgoing_rx: mpsc::UnboundedReceiver<ClientFrame>,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }

        let stream = tokio::select! {
            _ = shutdown.cancelled() => return,
            connected = connect_async(&ws_url) => match connected {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("Progress channel connect failed: {e}");
                    tokio::select! {
                        _ = shutdown.cancelled() => return,
                        _ = tokio::time::sleep(RECONNECT_DELAY) => continue,
                    }
                }
            },
        };

        info!("Progress channel connected");
        let (mut sink, mut source) = stream.split();

        // Re-announce every live topic. Subscribing is idempotent by topic
        // name, so a duplicate frame after a queued subscribe is harmless.
        // Catch-up for events missed while disconnected is never requested.
        let mut lost = false;
        for topic in registry.topics() {
            let frame = ClientFrame::Subscribe { topic };
            if send_frame(&mut sink, &frame).await.is_err() {
                lost = true;
                break;
            }
        }
        if lost {
            continue;
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                frame = outgoing_rx.recv() => {
                    match frame {
                        Some(frame) => {
                            if send_frame(&mut sink, &frame).await.is_err() {
                                break;
                            }
                        }
                        // All senders dropped: the channel handle is gone,
                        // so the connection goes with it.
                        None => {
                            let _ = sink.send(Message::Close(None)).await;
                            return;
                        }
                    }
                }
                message = source.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => handle_frame(&registry, &text),
                        Some(Ok(Message::Close(_))) | None => {
                            warn!("Progress channel closed by peer");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("Progress channel read error: {e}");
                            break;
                        }
                    }
                }
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
}

async fn send_frame<S>(sink: &mut S, frame: &ClientFrame) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not encode channel frame: {e}");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await.map_err(|_| {
        warn!("Progress channel write failed");
    })
}

/// Decodes one inbound frame and fans it out. Malformed frames are logged
/// and dropped; there is no error frame type in this protocol.
fn handle_frame(registry: &Registry, text: &str) {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(frame) => registry.dispatch(&frame.topic, frame.event.to_domain()),
        Err(e) => warn!("Failed to deserialize progress frame: {e}"),
    }
}
