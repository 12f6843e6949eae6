//! Retry policy for idempotent requests

use errors::{OutageError, OutageResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry with exponential backoff
///
/// An operation is attempted at most `max_retries + 1` times. Only errors for
/// which [`OutageError::is_retryable`] holds trigger another attempt; anything
/// else is returned immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further retry
    pub initial_backoff_ms: u64,
    /// Upper bound for a single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2000,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, never retried
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Retry without waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Total number of attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Whether a failure on the given (1-based) attempt deserves another try
    pub fn should_retry(&self, error: &OutageError, attempt: u32) -> bool {
        attempt <= self.max_retries && error.is_retryable()
    }

    pub fn validate(&self) -> OutageResult<()> {
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(OutageError::Configuration(format!(
                "retry.max_backoff_ms ({}) is lower than retry.initial_backoff_ms ({})",
                self.max_backoff_ms, self.initial_backoff_ms
            )));
        }
        Ok(())
    }

    /// Run `operation` until it succeeds, fails terminally or runs out of attempts
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> OutageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OutageResult<T>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                },
                Err(e) if self.should_retry(&e, attempt) => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                },
                Err(e) => {
                    if e.is_retryable() {
                        warn!(operation, attempt, error = %e, "Giving up after retries");
                    }
                    return Err(e);
                },
            }
        }
    }
}
