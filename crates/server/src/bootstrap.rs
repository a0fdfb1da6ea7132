use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use braseiro_backend::{HttpStatusSource, WebhookClient};
use braseiro_chat::{
    ChatRunner, ChatTransport, NoopChatTransport, ReconnectPolicy, SendQueue, SessionService,
};
use braseiro_core::config::{AppConfig, ConfigError, LoadOptions};
use braseiro_core::{
    Catalog, ConversationStore, DialogueEngine, OrderBackend, PriorityRegistry, StoreStatusCache,
    StoreStatusSource,
};

pub struct Application {
    pub config: AppConfig,
    pub priority: PriorityRegistry,
    pub status: Arc<StoreStatusCache>,
    pub transport: Arc<dyn ChatTransport>,
    pub outbox: SendQueue,
    pub chat_runner: ChatRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("dialogue patterns failed to compile: {0}")]
    Patterns(#[source] regex::Error),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting application bootstrap");

    let engine = DialogueEngine::new(Catalog::new()).map_err(BootstrapError::Patterns)?;
    let store = ConversationStore::new();
    let priority = PriorityRegistry::new();

    let status_source: Arc<dyn StoreStatusSource> =
        Arc::new(HttpStatusSource::new(&config.backend).map_err(BootstrapError::HttpClient)?);
    let status = Arc::new(StoreStatusCache::new(status_source));

    let backend: Arc<dyn OrderBackend> =
        Arc::new(WebhookClient::new(&config.backend).map_err(BootstrapError::HttpClient)?);

    let session = SessionService::new(
        engine,
        store,
        Arc::clone(&status),
        backend,
        priority.clone(),
        Duration::from_secs(config.chat.follow_up_delay_secs),
    );

    // The transport stays a noop until a concrete channel adapter is wired
    // in; the pump, retry, and admin surfaces are all exercised regardless.
    let transport: Arc<dyn ChatTransport> = Arc::new(NoopChatTransport);
    let reconnect_policy = ReconnectPolicy {
        max_retries: 5,
        base_delay_ms: config.chat.reconnect_initial_secs * 1_000,
        max_delay_ms: config.chat.reconnect_max_secs * 1_000,
    };
    let chat_runner = ChatRunner::new(Arc::clone(&transport), session, reconnect_policy);

    info!(
        webhook_url = %config.backend.webhook_url,
        status_url = %config.backend.status_url,
        "application bootstrap complete"
    );

    Ok(Application { config, priority, status, transport, outbox: SendQueue::new(), chat_runner })
}
