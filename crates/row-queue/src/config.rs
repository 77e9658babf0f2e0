//! Backend selection and driver configuration.

use crate::error::ConfigurationError;
use crate::message::QueueName;
use chrono::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Enumeration of supported queue backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Self-hosted polling engine over a relational row store
    Rdb,
    /// Externally managed AWS SQS queue
    Sqs,
}

/// Operational tunables shared by all backends.
///
/// Defaults match the historically hardcoded values: 10 second visibility
/// timeout, at most 10 deliveries per message, at most 10 messages per
/// receive call.
#[derive(Debug, Clone)]
pub struct QueueTuning {
    /// Duration after a claim during which a message is hidden from delivery
    pub visibility_timeout: Duration,
    /// Deliveries after which a message becomes permanently undeliverable
    pub max_receive_count: u32,
    /// Upper bound on messages returned by one receive call
    pub max_batch_size: u32,
}

impl Default for QueueTuning {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::seconds(10),
            max_receive_count: 10,
            max_batch_size: 10,
        }
    }
}

impl QueueTuning {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.visibility_timeout <= Duration::zero() {
            return Err(ConfigurationError::Invalid {
                key: "visibility_timeout".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.max_receive_count == 0 {
            return Err(ConfigurationError::Invalid {
                key: "max_receive_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_batch_size == 0 {
            return Err(ConfigurationError::Invalid {
                key: "max_batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for the relational polling engine
#[derive(Debug, Clone)]
pub struct RdbConfig {
    /// Path of the SQLite database file (created if missing)
    pub database_path: String,
    /// Target queue within the shared store
    pub queue_name: QueueName,
    pub tuning: QueueTuning,
}

impl RdbConfig {
    /// Create new configuration with default tuning
    pub fn new(
        database_path: impl Into<String>,
        queue_name: QueueName,
    ) -> Result<Self, ConfigurationError> {
        let database_path = database_path.into();
        if database_path.is_empty() {
            return Err(ConfigurationError::Missing {
                key: "database_path".to_string(),
            });
        }

        Ok(Self {
            database_path,
            queue_name,
            tuning: QueueTuning::default(),
        })
    }

    /// Override the visibility timeout
    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.tuning.visibility_timeout = timeout;
        self
    }

    /// Override the maximum receive count
    pub fn with_max_receive_count(mut self, count: u32) -> Self {
        self.tuning.max_receive_count = count;
        self
    }

    /// Override the per-call batch cap
    pub fn with_max_batch_size(mut self, size: u32) -> Self {
        self.tuning.max_batch_size = size;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        self.tuning.validate()
    }
}

/// Configuration for the AWS SQS adapter
#[derive(Debug, Clone)]
pub struct SqsConfig {
    /// Full URL of the target queue
    pub queue_url: String,
    /// Queue name, used for reporting only; SQS addresses queues by URL
    pub queue_name: QueueName,
    /// AWS region override; falls back to the ambient environment when unset
    pub region: Option<String>,
    pub tuning: QueueTuning,
}

impl SqsConfig {
    /// Create new configuration with default tuning
    pub fn new(
        queue_url: impl Into<String>,
        queue_name: QueueName,
    ) -> Result<Self, ConfigurationError> {
        let queue_url = queue_url.into();
        if queue_url.is_empty() {
            return Err(ConfigurationError::Missing {
                key: "queue_url".to_string(),
            });
        }

        Ok(Self {
            queue_url,
            queue_name,
            region: None,
            tuning: QueueTuning::default(),
        })
    }

    /// Set an explicit AWS region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the per-call batch cap
    pub fn with_max_batch_size(mut self, size: u32) -> Self {
        self.tuning.max_batch_size = size;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        self.tuning.validate()
    }
}

/// Backend-specific configuration accepted by the driver factory
#[derive(Debug, Clone)]
pub enum DriverConfig {
    Rdb(RdbConfig),
    Sqs(SqsConfig),
}

impl DriverConfig {
    /// Get the backend this configuration selects
    pub fn backend(&self) -> BackendType {
        match self {
            Self::Rdb(_) => BackendType::Rdb,
            Self::Sqs(_) => BackendType::Sqs,
        }
    }
}
