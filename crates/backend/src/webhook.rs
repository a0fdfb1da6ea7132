//! HTTP order backend: posts the finalized order to the restaurant's
//! order-management webhook and decodes the receipt.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use braseiro_core::config::BackendConfig;
use braseiro_core::{BackendError, OrderBackend, OrderSubmission, SubmissionReceipt};

pub struct WebhookClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookClient {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, webhook_url: config.webhook_url.clone() })
    }
}

#[async_trait]
impl OrderBackend for WebhookClient {
    async fn submit(&self, submission: &OrderSubmission) -> Result<SubmissionReceipt, BackendError> {
        debug!(url = %self.webhook_url, total = %submission.total_price, "posting order");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(submission)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http(format!("webhook returned status {status}")));
        }

        let body = response.text().await.map_err(request_error)?;
        parse_webhook_response(&body)
    }
}

fn request_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Http(error.to_string())
    }
}

/// The webhook answers `{"success": bool, ...receipt fields}`. The receipt
/// fields are only meaningful when `success` is true.
fn parse_webhook_response(body: &str) -> Result<SubmissionReceipt, BackendError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|error| BackendError::MalformedResponse(error.to_string()))?;

    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(BackendError::Rejected);
    }

    serde_json::from_value(value)
        .map_err(|error| BackendError::MalformedResponse(error.to_string()))
}
