//! Unified error handling for the outage tooling
//!
//! Every crate in the workspace reports failures through [`OutageError`], so a
//! failure raised by the HTTP layer reaches the CLI without being re-wrapped.

use thiserror::Error;

// ============================================================================
// OutageError - Main error type
// ============================================================================

/// Main error type for the outage client, pipeline and CLI
#[derive(Debug, Error)]
pub enum OutageError {
    // ======================================
    // Input & Configuration Errors
    // ======================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // ======================================
    // Lookup Errors
    // ======================================
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    // ======================================
    // Remote API Errors
    // ======================================
    #[error("Timeout waiting for response from {endpoint}")]
    Timeout { endpoint: String },

    #[error("Connection failed: {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("Request failed with status code {status} ({method} {endpoint})")]
    Status {
        method: &'static str,
        endpoint: String,
        status: u16,
    },

    #[error("Invalid response body from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // ======================================
    // Local Errors
    // ======================================
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using OutageError
pub type OutageResult<T> = Result<T, OutageError>;

impl OutageError {
    /// Build a not-found error for the named resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Build an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// HTTP status reported by the remote API, when one was observed
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is worth another attempt
    ///
    /// Only transient remote conditions qualify: timeouts, failed connections
    /// and 5xx responses. A 4xx response is the caller's fault and never is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Status { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

// Conversion traits for common error types
impl From<serde_json::Error> for OutageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// ============================================================================
// OutageError implements OutageErrorTrait
// ============================================================================

impl OutageErrorTrait for OutageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Connection { .. } => "CONNECTION_FAILED",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::HttpClient(_) => "HTTP_CLIENT_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Connection { .. } | Self::HttpClient(_) => ErrorCategory::Network,
            Self::Status { .. } | Self::Decode { .. } => ErrorCategory::Remote,
            Self::Serialization(_) => ErrorCategory::Internal,
        }
    }
}

// ============================================================================
// Error Trait - Architectural layer
// ============================================================================

/// Error category enum - used for classification and log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Caller side
    Validation,
    Configuration,
    NotFound,

    // Remote side
    Network,
    Timeout,
    Remote,

    // Local
    Internal,
}

/// Common interface for error types in the workspace
pub trait OutageErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for logs)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Configuration => Level::ERROR,
            ErrorCategory::Network | ErrorCategory::Timeout | ErrorCategory::Remote => Level::WARN,
            ErrorCategory::Validation | ErrorCategory::NotFound => Level::INFO,
        }
    }
}

// Tests
#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn status(code: u16) -> OutageError {
        OutageError::Status {
            method: "GET",
            endpoint: "/outages".into(),
            status: code,
        }
    }

    #[test]
    fn test_error_retryable() {
        assert!(OutageError::Timeout {
            endpoint: "/outages".into()
        }
        .is_retryable());
        assert!(OutageError::Connection {
            endpoint: "/outages".into(),
            reason: "refused".into()
        }
        .is_retryable());
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!OutageError::not_found("outages").is_retryable());
        assert!(!OutageError::invalid_input("bad date").is_retryable());
    }

    #[test]
    fn test_status_message_mentions_code() {
        let msg = status(403).to_string();
        assert!(msg.contains("failed"));
        assert!(msg.contains("403"));
        assert_eq!(status(404).status_code(), Some(404));
        assert_eq!(OutageError::not_found("site").status_code(), None);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            OutageError::not_found("site").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(status(500).category(), ErrorCategory::Remote);
        assert_eq!(
            OutageError::invalid_input("x").log_level(),
            tracing::Level::INFO
        );
        assert_eq!(status(500).error_code(), "HTTP_STATUS");
    }

    #[test]
    fn test_from_serde_json() {
        let err: OutageError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, OutageError::Serialization(_)));
    }
}
