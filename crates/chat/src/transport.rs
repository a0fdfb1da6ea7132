use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use braseiro_core::QuickReply;

/// Hard transport limit on selectable options per message.
pub const MAX_QUICK_REPLIES: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// One inbound (conversation, text) event. The text may be a synthetic
/// `btn_<n>` token when the customer tapped a quick reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub conversation_id: String,
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl OutboundMessage {
    pub fn text(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { conversation_id: conversation_id.into(), text: text.into(), quick_replies: Vec::new() }
    }

    pub fn is_rich(&self) -> bool {
        !self.quick_replies.is_empty()
    }

    /// The same message with the quick replies dropped, for the degraded
    /// resend path.
    pub fn as_plain(&self) -> Self {
        Self {
            conversation_id: self.conversation_id.clone(),
            text: self.text.clone(),
            quick_replies: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    pub(crate) fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// The chat capability the dialogue needs: deliver text to a recipient,
/// receive text from a recipient. Pairing, presence, and message framing
/// live behind this trait.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_message(&self) -> Result<Option<InboundMessage>, TransportError>;
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopChatTransport;

#[async_trait]
impl ChatTransport for NoopChatTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_message(&self) -> Result<Option<InboundMessage>, TransportError> {
        Ok(None)
    }

    async fn send(&self, _message: &OutboundMessage) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use braseiro_core::QuickReply;

    use super::{OutboundMessage, ReconnectPolicy};

    #[test]
    fn backoff_grows_and_saturates() {
        let policy = ReconnectPolicy { max_retries: 5, base_delay_ms: 100, max_delay_ms: 1_000 };
        assert_eq!(policy.backoff(0).as_millis(), 100);
        assert_eq!(policy.backoff(1).as_millis(), 200);
        assert_eq!(policy.backoff(2).as_millis(), 400);
        assert_eq!(policy.backoff(10).as_millis(), 1_000);
    }

    #[test]
    fn plain_downgrade_drops_quick_replies() {
        let rich = OutboundMessage {
            conversation_id: "a".into(),
            text: "hello".into(),
            quick_replies: vec![QuickReply::new("btn_0", "Menu")],
        };
        assert!(rich.is_rich());
        let plain = rich.as_plain();
        assert!(!plain.is_rich());
        assert_eq!(plain.text, "hello");
    }
}
