//! Error types for queue operations.

use chrono::Duration;
use thiserror::Error;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// Comprehensive error type for all queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Message body already exists on queue '{queue}'")]
    DuplicateMessage { queue: String },

    #[error("Payload encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("No messages available on queue '{queue}'")]
    NoMessages { queue: String },

    #[error("No record found for delete tag '{delete_tag}'")]
    NotFound { delete_tag: String },

    #[error("Delete tag '{delete_tag}' is no longer inside its delivery window")]
    Timing { delete_tag: String },

    #[error("Store operation failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Operation exceeded its deadline of {deadline:?}")]
    Timeout { deadline: Duration },

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },
}

impl QueueError {
    /// Check if error is transient and a retry by the caller may succeed.
    ///
    /// No operation retries internally; this is advisory only.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::DuplicateMessage { .. } => false,
            Self::Encoding(_) => false,
            Self::NoMessages { .. } => true,
            Self::NotFound { .. } => false,
            Self::Timing { .. } => false,
            Self::Store(_) => true, // Contention and connectivity failures usually clear
            Self::Timeout { .. } => true,
            Self::Provider { .. } => true,
        }
    }

    /// Get suggested retry delay for transient errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::NoMessages { .. } => Some(Duration::seconds(1)),
            Self::Store(_) => Some(Duration::milliseconds(100)),
            Self::Timeout { .. } => Some(Duration::seconds(1)),
            Self::Provider { .. } => Some(Duration::seconds(5)),
            _ => None,
        }
    }
}

/// Configuration errors surfaced by the fallible constructors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Invalid configuration for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Errors during payload serialization/deserialization
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode body for delete tag '{delete_tag}': {detail}")]
    Decode { delete_tag: String, detail: String },
}
