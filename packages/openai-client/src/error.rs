//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
///
/// Every variant describes a failure of the HTTP exchange itself. What the
/// model *said* is never judged here; callers own that.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP 429 (rate limit or exhausted quota)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// API error (non-2xx response, empty choice list)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (response body was not the expected envelope)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Build an API error from an HTTP status and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify a reqwest send failure.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Whether retrying the same request later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Parse(_) => false,
        }
    }
}
