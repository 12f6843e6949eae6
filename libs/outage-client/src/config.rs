//! Client configuration

use crate::retry::RetryPolicy;
use errors::{OutageError, OutageResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL of the hosted outage API
pub const DEFAULT_BASE_URL: &str = "https://api.krakenflex.systems/interview-tests-mock-api/v1";

/// Per-attempt request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Settings handed to [`crate::OutageClient::new`]
///
/// Holds no secrets; the API key is passed to the constructor separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL the endpoint paths are appended to
    pub base_url: String,
    /// Timeout of a single HTTP attempt in milliseconds
    pub timeout_ms: u64,
    /// Retry policy for the read endpoints
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> OutageResult<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(OutageError::Configuration(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(OutageError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(OutageError::Configuration(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        self.retry.validate()
    }
}
