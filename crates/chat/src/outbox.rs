//! Decoupled outbound queue for messages that are not replies to an inbound
//! event (admin notices, campaign texts). Drained on a fixed interval;
//! failed sends go back to the front of the queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::transport::{ChatTransport, OutboundMessage};

#[derive(Clone, Default)]
pub struct SendQueue {
    inner: Arc<Mutex<VecDeque<OutboundMessage>>>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, message: OutboundMessage) {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push_back(message);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends everything currently queued. A failed send is re-queued at the
    /// front and the drain stops, so ordering per recipient is preserved.
    pub async fn drain(&self, transport: &dyn ChatTransport) {
        loop {
            let next = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .pop_front();
            let Some(message) = next else {
                return;
            };

            if let Err(error) = transport.send(&message).await {
                warn!(
                    conversation_id = %message.conversation_id,
                    %error,
                    "outbox send failed, re-queueing"
                );
                self.inner
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push_front(message);
                return;
            }
            debug!(conversation_id = %message.conversation_id, "outbox message delivered");
        }
    }

    /// Drains on a fixed cadence until the task is aborted.
    pub async fn run(self, transport: Arc<dyn ChatTransport>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.drain(transport.as_ref()).await;
        }
    }
}
