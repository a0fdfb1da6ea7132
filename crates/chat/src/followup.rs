//! Delayed follow-up after an agent-handoff request. One cancellable task
//! per conversation; the task re-checks the priority registry when it fires
//! so a conversation that already moved on stays quiet.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use braseiro_core::PriorityRegistry;

use crate::transport::{ChatTransport, OutboundMessage};

pub fn follow_up_text() -> String {
    "💬 *Sua mensagem foi recebida!*\n\n\
     Nossa equipe está verificando e vai te responder em breve. \
     Obrigado pela paciência! 🙏"
        .to_string()
}

pub struct FollowUpScheduler {
    priority: PriorityRegistry,
    delay: Duration,
    pending: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl FollowUpScheduler {
    pub fn new(priority: PriorityRegistry, delay: Duration) -> Self {
        Self { priority, delay, pending: Mutex::new(HashMap::new()) }
    }

    /// Schedules the follow-up for `conversation_id`, replacing any timer
    /// already pending for it.
    pub fn schedule(&self, transport: Arc<dyn ChatTransport>, conversation_id: &str) {
        let priority = self.priority.clone();
        let delay = self.delay;
        let id = conversation_id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !priority.contains(&id) {
                return;
            }
            let message = OutboundMessage::text(id.clone(), follow_up_text());
            if let Err(error) = transport.send(&message).await {
                warn!(conversation_id = %id, %error, "follow-up send failed");
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.insert(conversation_id.to_string(), handle) {
            previous.abort();
        }
    }

    /// Aborts the pending timer, e.g. when the conversation is deleted.
    pub fn cancel(&self, conversation_id: &str) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(conversation_id);
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}
