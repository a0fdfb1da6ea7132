mod bootstrap;
mod health;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use braseiro_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use braseiro_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        Arc::clone(&app.status),
        app.priority.clone(),
    )
    .await?;

    let outbox_task = tokio::spawn(
        app.outbox.clone().run(
            Arc::clone(&app.transport),
            Duration::from_secs(app.config.chat.outbox_interval_secs),
        ),
    );

    app.chat_runner.start().await?;
    tracing::info!("braseiro-server started");

    wait_for_shutdown().await?;
    tracing::info!("braseiro-server stopping");

    // Give the outbox one bounded chance to flush before exiting.
    let drain = app.outbox.drain(app.transport.as_ref());
    let _ = tokio::time::timeout(
        Duration::from_secs(app.config.server.graceful_shutdown_secs),
        drain,
    )
    .await;
    outbox_task.abort();

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
