//! HTTP source for the store open/closed status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use braseiro_core::config::BackendConfig;
use braseiro_core::{StatusError, StoreStatus, StoreStatusSource};

pub struct HttpStatusSource {
    client: reqwest::Client,
    status_url: String,
}

impl HttpStatusSource {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, status_url: config.status_url.clone() })
    }
}

#[async_trait]
impl StoreStatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<StoreStatus, StatusError> {
        let response = self
            .client
            .get(&self.status_url)
            .send()
            .await
            .map_err(|error| StatusError::Http(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Http(format!("status endpoint returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|error| StatusError::Http(error.to_string()))?;
        let parsed = parse_status_response(&body)?;
        debug!(is_open = parsed.is_open, "fetched store status");
        Ok(parsed)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload {
    /// Absent means open; only an explicit `false` closes the store.
    #[serde(default = "default_open")]
    is_open: bool,
    #[serde(default)]
    next_open_time: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn default_open() -> bool {
    true
}

fn parse_status_response(body: &str) -> Result<StoreStatus, StatusError> {
    let payload: StatusPayload =
        serde_json::from_str(body).map_err(|error| StatusError::Decode(error.to_string()))?;
    Ok(StoreStatus {
        is_open: payload.is_open,
        next_open_time: payload.next_open_time,
        message: payload.message,
        last_checked: None,
    })
}

#[cfg(test)]
mod tests {
    use braseiro_core::StatusError;

    use super::parse_status_response;

    #[test]
    fn closed_store_carries_reopen_time_and_message() {
        let status = parse_status_response(
            r#"{"isOpen": false, "nextOpenTime": "18:00", "message": "Voltamos logo!"}"#,
        )
        .expect("parses");

        assert!(!status.is_open);
        assert_eq!(status.next_open_time.as_deref(), Some("18:00"));
        assert_eq!(status.message.as_deref(), Some("Voltamos logo!"));
    }

    #[test]
    fn missing_open_flag_defaults_to_open() {
        let status = parse_status_response("{}").expect("parses");
        assert!(status.is_open);
        assert!(status.next_open_time.is_none());
    }

    #[test]
    fn invalid_body_is_a_decode_error() {
        let error = parse_status_response("not json").expect_err("decode error");
        assert!(matches!(error, StatusError::Decode(_)));
    }
}
