//! Outage API client
//!
//! Wraps the three endpoints of the remote outage API:
//!
//! - `GET /outages`
//! - `GET /site-info/{siteId}`
//! - `POST /site-outages/{siteId}`
//!
//! The two reads are retried on transient failures according to a
//! [`RetryPolicy`]; the submission is sent exactly once. HTTP itself sits
//! behind [`HttpTransport`] so the retry behaviour can be exercised without a
//! network.

pub mod client;
pub mod config;
pub mod retry;
pub mod transport;

// Re-exports for convenience
pub use client::{OutageApi, OutageClient};
pub use config::{ClientConfig, API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use retry::RetryPolicy;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, ReqwestTransport};
