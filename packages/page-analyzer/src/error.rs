//! Typed errors for the page analyzer.
//!
//! The three failure kinds a decision cycle can produce are kept apart so
//! the crawl loop can pick a remedy: retry later (transport), re-prompt
//! (parse), or abandon the page (validation).

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`PageAnalyzer`](crate::PageAnalyzer) entry points.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The model call itself failed
    #[error("model transport error: {0}")]
    Transport(#[from] TransportError),

    /// No JSON object could be recovered from the response text
    #[error(transparent)]
    Parse(#[from] ResponseParseError),

    /// A JSON object was recovered but does not fit the schema
    #[error(transparent)]
    Validation(#[from] ResponseValidationError),
}

impl AnalyzerError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The unparseable model output, when this is a parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Parse(e) => Some(&e.raw),
            _ => None,
        }
    }
}

/// Broad category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Network,
    Timeout,
    RateLimited,
    Api,
    Cancelled,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate limited",
            Self::Api => "api",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// A failure of the model collaborator, carried through unchanged.
#[derive(Debug, Error)]
#[error("{kind}: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(
        kind: TransportErrorKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// The in-flight call was cancelled by its owner.
    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "model call cancelled")
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The collaborator's original error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::Network | TransportErrorKind::Timeout | TransportErrorKind::RateLimited
        )
    }
}

/// The response text held no recoverable JSON object.
#[derive(Debug, Clone, Error)]
#[error("no JSON object in model response (direct decode: {direct}; brace span: {brace_span})")]
pub struct ResponseParseError {
    /// The model output exactly as received
    pub raw: String,

    /// Why decoding the whole text failed
    pub direct: String,

    /// Why decoding the `{...}` span failed, or that there was none
    pub brace_span: String,
}

/// A decoded JSON value that does not satisfy a schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid field `{path}`: {reason} (got {value})")]
pub struct ResponseValidationError {
    /// Dotted path to the failing field, e.g. `opportunities[2].title`
    pub path: String,

    /// The offending value, `null` when missing
    pub value: Value,

    pub reason: String,
}

impl ResponseValidationError {
    pub fn new(path: impl Into<String>, value: Value, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// Bad configuration value.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {variable}: {reason}")]
pub struct ConfigError {
    pub variable: String,
    pub value: String,
    pub reason: String,
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for schema validation.
pub type ValidationResult<T> = std::result::Result<T, ResponseValidationError>;
