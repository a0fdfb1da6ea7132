//! Store open/closed status, cached process-wide with a short TTL and a
//! fail-open policy: an unreachable status source must never block orders.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StatusError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub is_open: bool,
    pub next_open_time: Option<String>,
    pub message: Option<String>,
    #[serde(skip)]
    pub last_checked: Option<DateTime<Utc>>,
}

impl Default for StoreStatus {
    fn default() -> Self {
        // Fail-open: with no information we assume the store is taking orders.
        Self { is_open: true, next_open_time: None, message: None, last_checked: None }
    }
}

impl StoreStatus {
    pub fn open() -> Self {
        Self::default()
    }
}

/// Where the open/closed flag comes from. The production impl is an HTTP
/// client; tests substitute a canned source.
#[async_trait]
pub trait StoreStatusSource: Send + Sync {
    async fn fetch(&self) -> Result<StoreStatus, StatusError>;
}

/// TTL cache over a [`StoreStatusSource`]. The fetch runs outside the lock,
/// so two simultaneous refreshes may both hit the source; the overwrite is
/// idempotent and the duplicate is harmless.
pub struct StoreStatusCache {
    source: Arc<dyn StoreStatusSource>,
    ttl: Duration,
    cached: Mutex<StoreStatus>,
    last_error: Mutex<Option<StatusError>>,
}

impl StoreStatusCache {
    pub fn new(source: Arc<dyn StoreStatusSource>) -> Self {
        Self::with_ttl(source, Duration::from_secs(60))
    }

    pub fn with_ttl(source: Arc<dyn StoreStatusSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Mutex::new(StoreStatus::default()),
            last_error: Mutex::new(None),
        }
    }

    /// The error from the most recent refresh, if it failed. The snapshot
    /// itself fails open, so this is the only place a broken status endpoint
    /// shows up.
    pub fn last_error(&self) -> Option<StatusError> {
        self.last_error.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Returns the cached status, refreshing it when stale. On refresh
    /// failure the store is assumed open and the rest of the cached values
    /// are retained.
    pub async fn snapshot(&self) -> StoreStatus {
        let stale = {
            let cached = self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match cached.last_checked {
                Some(checked) => {
                    Utc::now().signed_duration_since(checked).num_milliseconds()
                        > self.ttl.as_millis() as i64
                }
                None => true,
            }
        };

        if stale {
            let refreshed = self.source.fetch().await;
            let mut cached = self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match refreshed {
                Ok(mut status) => {
                    status.last_checked = Some(Utc::now());
                    *cached = status;
                    *self.last_error.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
                        None;
                }
                Err(error) => {
                    tracing::warn!(%error, "store status refresh failed, assuming open");
                    cached.is_open = true;
                    cached.last_checked = Some(Utc::now());
                    *self.last_error.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
                        Some(error);
                }
            }
        }

        self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}
