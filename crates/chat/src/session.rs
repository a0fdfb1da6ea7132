//! Per-message orchestration: run the dialogue transition, deliver the
//! replies, and execute the resulting effect. Failures here are isolated to
//! the one conversation being handled.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use tracing::{info, warn};

use braseiro_core::{
    build_submission, confirmation_message, submission_failed_message, ConversationStore,
    DialogueEngine, Effect, OrderBackend, PriorityRegistry, Reply, StoreStatusCache, TurnContext,
};

use crate::followup::FollowUpScheduler;
use crate::transport::{ChatTransport, InboundMessage, OutboundMessage, MAX_QUICK_REPLIES};

pub struct SessionService {
    engine: DialogueEngine,
    store: ConversationStore,
    status: Arc<StoreStatusCache>,
    backend: Arc<dyn OrderBackend>,
    priority: PriorityRegistry,
    follow_up: FollowUpScheduler,
}

impl SessionService {
    pub fn new(
        engine: DialogueEngine,
        store: ConversationStore,
        status: Arc<StoreStatusCache>,
        backend: Arc<dyn OrderBackend>,
        priority: PriorityRegistry,
        follow_up_delay: Duration,
    ) -> Self {
        let follow_up = FollowUpScheduler::new(priority.clone(), follow_up_delay);
        Self { engine, store, status, backend, priority, follow_up }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn priority(&self) -> &PriorityRegistry {
        &self.priority
    }

    /// Processes one inbound message to completion: transition, sends, and
    /// at most one backend call.
    pub async fn handle_inbound(&self, transport: &Arc<dyn ChatTransport>, inbound: &InboundMessage) {
        let conversation_id = inbound.conversation_id.as_str();
        let ctx = TurnContext {
            status: self.status.snapshot().await,
            hour: Local::now().hour(),
        };

        let step = self
            .store
            .with(conversation_id, |conversation| {
                info!(
                    conversation_id,
                    state = ?conversation.state,
                    text = %inbound.text,
                    "processing inbound message"
                );
                self.engine.handle(conversation, &inbound.text, &ctx)
            });

        for reply in &step.replies {
            self.deliver(transport, conversation_id, reply).await;
        }

        match step.effect {
            None => {}
            Some(Effect::EndConversation) => {
                self.store.remove(conversation_id);
                self.priority.remove(conversation_id);
                self.follow_up.cancel(conversation_id);
            }
            Some(Effect::AgentRequested) => {
                self.priority.mark(conversation_id);
                self.follow_up.schedule(Arc::clone(transport), conversation_id);
            }
            Some(Effect::SubmitOrder) => {
                self.submit_order(transport, conversation_id).await;
            }
        }
    }

    async fn submit_order(&self, transport: &Arc<dyn ChatTransport>, conversation_id: &str) {
        let order = self.store.with(conversation_id, |conversation| conversation.order.clone());
        let submission = build_submission(conversation_id, &order);

        match self.backend.submit(&submission).await {
            Ok(receipt) => {
                info!(
                    conversation_id,
                    order_id = %receipt.order_id,
                    display_id = %receipt.display_label(),
                    total = %submission.total_price,
                    "order submitted"
                );
                let confirmation =
                    OutboundMessage::text(conversation_id, confirmation_message(&order, &receipt));
                self.send_with_fallback(transport, confirmation).await;

                self.store.remove(conversation_id);
                self.priority.remove(conversation_id);
                self.follow_up.cancel(conversation_id);
            }
            Err(error) => {
                // State stays at the payment prompt so the customer can
                // retry without re-entering anything.
                warn!(conversation_id, %error, "order submission failed");
                let message =
                    OutboundMessage::text(conversation_id, submission_failed_message());
                self.send_with_fallback(transport, message).await;
            }
        }
    }

    async fn deliver(&self, transport: &Arc<dyn ChatTransport>, conversation_id: &str, reply: &Reply) {
        let mut quick_replies = reply.quick_replies.clone();
        quick_replies.truncate(MAX_QUICK_REPLIES);
        let message = OutboundMessage {
            conversation_id: conversation_id.to_string(),
            text: reply.text.clone(),
            quick_replies,
        };
        self.send_with_fallback(transport, message).await;
    }

    /// Best-effort delivery: a failed rich send is retried once as plain
    /// text; a failed plain send is only logged, since the customer has no
    /// channel to be told the send failed.
    async fn send_with_fallback(&self, transport: &Arc<dyn ChatTransport>, message: OutboundMessage) {
        match transport.send(&message).await {
            Ok(()) => {}
            Err(error) if message.is_rich() => {
                warn!(
                    conversation_id = %message.conversation_id,
                    %error,
                    "rich send failed, retrying as plain text"
                );
                if let Err(error) = transport.send(&message.as_plain()).await {
                    warn!(
                        conversation_id = %message.conversation_id,
                        %error,
                        "plain-text fallback send failed"
                    );
                }
            }
            Err(error) => {
                warn!(conversation_id = %message.conversation_id, %error, "send failed");
            }
        }
    }
}
