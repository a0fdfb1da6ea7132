//! HTTP adapters for the braseiro ports:
//! - `WebhookClient` submits finalized orders (`OrderBackend`)
//! - `HttpStatusSource` reads the store open/closed endpoint
//!   (`StoreStatusSource`)
//!
//! Both are thin reqwest wrappers; retry, caching, and user-facing fallback
//! behavior live with the callers in `braseiro-core`.

pub mod status;
pub mod webhook;

pub use status::HttpStatusSource;
pub use webhook::WebhookClient;
