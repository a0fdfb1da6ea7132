use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use braseiro_core::{PrioritizedConversation, PriorityRegistry, StoreStatusCache};

#[derive(Clone)]
pub struct AdminState {
    status: Arc<StoreStatusCache>,
    priority: PriorityRegistry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub store_status: HealthCheck,
    pub checked_at: String,
}

pub fn router(status: Arc<StoreStatusCache>, priority: PriorityRegistry) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin/priority", get(priority_list))
        .with_state(AdminState { status, priority })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    status: Arc<StoreStatusCache>,
    priority: PriorityRegistry,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(bind_address = %address, "health endpoint started");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(status, priority)).await {
            error!(%error, "health endpoint server terminated unexpectedly");
        }
    });

    Ok(())
}

pub async fn health(State(state): State<AdminState>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = state.status.snapshot().await;
    let store_status = match state.status.last_error() {
        None => HealthCheck {
            status: "ready",
            detail: if snapshot.is_open {
                "store is open".to_string()
            } else {
                "store is closed".to_string()
            },
        },
        Some(error) => HealthCheck {
            status: "degraded",
            detail: format!("store status refresh failed, assuming open: {error}"),
        },
    };
    let ready = store_status.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "braseiro-server runtime initialized".to_string(),
        },
        store_status,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Conversations flagged for human attention, oldest waiters first.
pub async fn priority_list(
    State(state): State<AdminState>,
) -> Json<Vec<PrioritizedConversation>> {
    Json(state.priority.list())
}
