use thiserror::Error;

/// Failures talking to the order-management backend. All variants map to the
/// same user-facing retry message; the distinction exists for logs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("order backend reported failure")]
    Rejected,
    #[error("order backend request failed: {0}")]
    Http(String),
    #[error("order backend request timed out")]
    Timeout,
    #[error("order backend returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Failures fetching store open/closed status. Callers fail open.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("store status request failed: {0}")]
    Http(String),
    #[error("store status response could not be decoded: {0}")]
    Decode(String),
}
