use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::session::SessionService;
use crate::transport::{ChatTransport, ReconnectPolicy};

pub struct ChatRunner {
    transport: Arc<dyn ChatTransport>,
    session: SessionService,
    reconnect_policy: ReconnectPolicy,
}

impl ChatRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        session: SessionService,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, session, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "chat transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "chat transport retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), crate::transport::TransportError> {
        info!(attempt, "opening chat transport connection");
        self.transport.connect().await?;
        info!(attempt, "chat transport connected");

        loop {
            let Some(inbound) = self.transport.next_message().await? else {
                info!(attempt, "chat transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            info!(
                conversation_id = %inbound.conversation_id,
                "received chat message"
            );

            // Errors inside one conversation never tear down the pump.
            self.session.handle_inbound(&self.transport, &inbound).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use braseiro_core::{
        BackendError, Catalog, ConversationStore, DialogueEngine, OrderBackend, OrderSubmission,
        PriorityRegistry, StatusError, StoreStatus, StoreStatusCache, StoreStatusSource,
        SubmissionReceipt,
    };

    use crate::session::SessionService;
    use crate::transport::{
        ChatTransport, InboundMessage, OutboundMessage, ReconnectPolicy, TransportError,
    };

    use super::ChatRunner;

    type ReceiveScript = VecDeque<Result<Option<InboundMessage>, TransportError>>;

    #[derive(Default)]
    struct ScriptedTransport {
        connect_results: Mutex<VecDeque<Result<(), TransportError>>>,
        receive_script: Mutex<ReceiveScript>,
        sent: Mutex<Vec<OutboundMessage>>,
        connect_attempts: Mutex<u32>,
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            *self.connect_attempts.lock().expect("lock") += 1;
            self.connect_results.lock().expect("lock").pop_front().unwrap_or(Ok(()))
        }

        async fn next_message(&self) -> Result<Option<InboundMessage>, TransportError> {
            self.receive_script.lock().expect("lock").pop_front().unwrap_or(Ok(None))
        }

        async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
            self.sent.lock().expect("lock").push(message.clone());
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct NeverBackend;

    #[async_trait]
    impl OrderBackend for NeverBackend {
        async fn submit(
            &self,
            _submission: &OrderSubmission,
        ) -> Result<SubmissionReceipt, BackendError> {
            Err(BackendError::Timeout)
        }
    }

    struct OpenSource;

    #[async_trait]
    impl StoreStatusSource for OpenSource {
        async fn fetch(&self) -> Result<StoreStatus, StatusError> {
            Ok(StoreStatus::open())
        }
    }

    fn session() -> SessionService {
        SessionService::new(
            DialogueEngine::new(Catalog::new()).expect("engine builds"),
            ConversationStore::new(),
            Arc::new(StoreStatusCache::new(Arc::new(OpenSource))),
            Arc::new(NeverBackend),
            PriorityRegistry::new(),
            Duration::from_secs(30),
        )
    }

    fn fast_policy() -> ReconnectPolicy {
        ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 }
    }

    fn inbound(text: &str) -> Result<Option<InboundMessage>, TransportError> {
        Ok(Some(InboundMessage { conversation_id: "a".into(), text: text.into() }))
    }

    #[tokio::test]
    async fn pumps_messages_until_the_stream_closes() {
        let transport = Arc::new(ScriptedTransport {
            receive_script: Mutex::new(VecDeque::from([inbound("oi"), Ok(None)])),
            ..ScriptedTransport::default()
        });
        let runner = ChatRunner::new(
            Arc::clone(&transport) as Arc<dyn ChatTransport>,
            session(),
            fast_policy(),
        );

        runner.start().await.expect("runner completes");

        let sent = transport.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("BRASEIRO BURGUER"));
    }

    #[tokio::test]
    async fn reconnects_after_an_initial_connect_failure() {
        let transport = Arc::new(ScriptedTransport {
            connect_results: Mutex::new(VecDeque::from([Err(TransportError::Connect(
                "dns".into(),
            ))])),
            receive_script: Mutex::new(VecDeque::from([inbound("oi"), Ok(None)])),
            ..ScriptedTransport::default()
        });
        let runner = ChatRunner::new(
            Arc::clone(&transport) as Arc<dyn ChatTransport>,
            session(),
            fast_policy(),
        );

        runner.start().await.expect("runner completes");

        assert_eq!(*transport.connect_attempts.lock().expect("lock"), 2);
        assert_eq!(transport.sent.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_return_without_error() {
        let transport = Arc::new(ScriptedTransport {
            connect_results: Mutex::new(VecDeque::from([
                Err(TransportError::Connect("down".into())),
                Err(TransportError::Connect("down".into())),
                Err(TransportError::Connect("down".into())),
            ])),
            ..ScriptedTransport::default()
        });
        let runner = ChatRunner::new(
            Arc::clone(&transport) as Arc<dyn ChatTransport>,
            session(),
            fast_policy(),
        );

        runner.start().await.expect("exhaustion is not a crash");
        assert_eq!(*transport.connect_attempts.lock().expect("lock"), 3);
    }
}
