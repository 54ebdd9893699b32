//! Error types for the chat engine.
//!
//! Backend errors never reach the visitor: the orchestrator absorbs them and
//! degrades to canned replies. Data and config errors surface from `init_app`.

use thiserror::Error;

/// Failures reported by a language model gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("context length exceeded: {0}")]
    ContextLengthExceeded(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("backend error: {0}")]
    Generic(String),
}

impl BackendError {
    /// Stable name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Auth(_) => "auth",
            BackendError::RateLimit(_) => "rate_limit",
            BackendError::ContextLengthExceeded(_) => "context_length_exceeded",
            BackendError::Malformed(_) => "malformed",
            BackendError::Generic(_) => "generic",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Malformed(err.to_string())
        } else {
            BackendError::Generic(err.to_string())
        }
    }
}

/// Failures loading the content repository or canned response table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: String, value: String },
}

/// Startup failures: bad configuration or unreadable data.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}
