//! Error types for Doclassify

use serde::{Deserialize, Serialize};

/// Result type alias using Doclassify's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a classification attempt settled without an outcome.
///
/// Both variants are terminal for the attempt that produced them. They render
/// the same way to a user but stay distinct so logs can tell a flaky network
/// apart from a service that broke its response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Network unreachable, timeout, or non-2xx status
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not parse into the expected shape, or held no scores
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl FailureReason {
    /// Create a new transport failure
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new malformed-response failure
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Stable identifier for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Core error type for Doclassify operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request parameters out of range
    #[error("invalid request parameters: {0}")]
    InvalidParams(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A classification attempt failed
    #[error(transparent)]
    Failure(#[from] FailureReason),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new invalid-parameters error
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
