//! The driver contract shared by the polling engine and managed-queue adapters.

use crate::config::{BackendType, DriverConfig};
use crate::drivers::{RdbDriver, SqsDriver};
use crate::error::QueueError;
use crate::message::{Envelope, ReceivedBatch};
use async_trait::async_trait;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

/// Operation surface implemented by every queue backend.
///
/// All delivery is at-least-once and ordering is best-effort oldest-first
/// within one `receives` call only. Every operation is bounded by the
/// caller-supplied deadline; on expiry it aborts without partial mutation
/// and returns [`QueueError::Timeout`]. Nothing is retried internally.
#[async_trait]
pub trait QueueDriver<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Enqueue one payload
    async fn send(&self, deadline: Duration, payload: T) -> Result<(), QueueError>;

    /// Enqueue several payloads in order, stopping at the first failure
    async fn send_batch(&self, deadline: Duration, payloads: Vec<T>) -> Result<(), QueueError>;

    /// Claim and return a single message
    async fn receive(&self, deadline: Duration) -> Result<Envelope<T>, QueueError>;

    /// Claim and return up to the configured batch cap of messages.
    ///
    /// Fails with [`QueueError::NoMessages`] when nothing is eligible; an
    /// empty-but-successful poll never occurs.
    async fn receives(&self, deadline: Duration) -> Result<ReceivedBatch<T>, QueueError>;

    /// Acknowledge a received message by its delete tag
    async fn delete(&self, deadline: Duration, envelope: &Envelope<T>) -> Result<(), QueueError>;

    /// Get the backend type behind this driver
    fn backend(&self) -> BackendType;
}

/// Factory for creating queue drivers from backend configuration
pub struct QueueDriverFactory;

impl QueueDriverFactory {
    /// Create the driver selected by `config`
    pub async fn create<T>(config: DriverConfig) -> Result<Box<dyn QueueDriver<T>>, QueueError>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        match config {
            DriverConfig::Rdb(rdb_config) => Ok(Box::new(RdbDriver::connect(rdb_config).await?)),
            DriverConfig::Sqs(sqs_config) => Ok(Box::new(SqsDriver::connect(sqs_config).await?)),
        }
    }
}

/// Run `operation` under the caller's deadline.
///
/// On expiry the future is dropped, which rolls back any open store
/// transaction, and the call reports [`QueueError::Timeout`]. A
/// non-positive deadline counts as already expired.
pub(crate) async fn bounded<F, T>(deadline: Duration, operation: F) -> Result<T, QueueError>
where
    F: Future<Output = Result<T, QueueError>> + Send,
{
    let budget = deadline
        .to_std()
        .map_err(|_| QueueError::Timeout { deadline })?;
    match tokio::time::timeout(budget, operation).await {
        Ok(result) => result,
        Err(_) => Err(QueueError::Timeout { deadline }),
    }
}
