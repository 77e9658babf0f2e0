//! Polling queue engine over the relational record store.
//!
//! Reimplements cloud-queue-style visibility-timeout delivery on a plain
//! SQLite table, without a broker process. Each message's logical state is
//! derived from its stored fields, never stored explicitly:
//!
//! - **Available**: `receive_count < max_receive_count` and the visibility
//!   window since `updated_at` has elapsed.
//! - **InFlight**: under the receive ceiling but still inside the window.
//! - **Exhausted**: `receive_count >= max_receive_count`. Terminal; the row
//!   is never delivered again and never cleaned up automatically.
//!
//! A freshly sent message starts with `updated_at = now`, so it only becomes
//! Available once one full visibility window has passed. Claiming refreshes
//! `updated_at`, which restarts the window and moves the row to InFlight.
//!
//! Multiple independent callers (tasks or processes) may poll the same store
//! concurrently; claim exclusivity comes entirely from the store transaction,
//! with no in-process locking.

use crate::config::{BackendType, RdbConfig};
use crate::driver::{bounded, QueueDriver};
use crate::error::{EncodingError, QueueError};
use crate::message::{self, DecodeFailure, DeleteTag, Envelope, QueueName, ReceivedBatch};
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "rdb_tests.rs"]
mod tests;

/// Self-hosted polling queue driver backed by [`RecordStore`]
pub struct RdbDriver<T> {
    store: RecordStore,
    queue_name: QueueName,
    visibility_timeout: Duration,
    max_receive_count: u32,
    max_batch_size: u32,
    _payload: PhantomData<fn() -> T>,
}

impl<T> RdbDriver<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Open the backing store and build a driver for the configured queue
    pub async fn connect(config: RdbConfig) -> Result<Self, QueueError> {
        config.validate()?;
        let store = RecordStore::open(&config.database_path).await?;
        Ok(Self {
            store,
            queue_name: config.queue_name,
            visibility_timeout: config.tuning.visibility_timeout,
            max_receive_count: config.tuning.max_receive_count,
            max_batch_size: config.tuning.max_batch_size,
            _payload: PhantomData,
        })
    }

    async fn send_inner(&self, payload: &T) -> Result<(), QueueError> {
        let body = message::encode_body(payload)?;
        let delete_tag = DeleteTag::generate();
        let now_ms = Utc::now().timestamp_millis();

        let mut tx = self.store.begin().await?;
        RecordStore::insert(
            &mut tx,
            self.queue_name.as_str(),
            &body,
            delete_tag.as_str(),
            now_ms,
        )
        .await?;
        tx.commit().await?;

        debug!(queue = %self.queue_name, delete_tag = %delete_tag, "message enqueued");
        Ok(())
    }

    /// Claim up to `limit` available records and decode them.
    ///
    /// The claim itself is one committed transaction; decoding happens after
    /// the commit, so a malformed body still counts as a delivery and is
    /// reported per item rather than dropped.
    async fn receives_inner(&self, limit: u32) -> Result<ReceivedBatch<T>, QueueError> {
        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let cutoff_ms = now_ms - self.visibility_timeout.num_milliseconds();

        let mut tx = self.store.begin().await?;
        let claimed = RecordStore::claim_available(
            &mut tx,
            self.queue_name.as_str(),
            self.max_receive_count,
            cutoff_ms,
            now_ms,
            limit,
        )
        .await?;

        if claimed.is_empty() {
            tx.rollback().await?;
            return Err(QueueError::NoMessages {
                queue: self.queue_name.to_string(),
            });
        }
        tx.commit().await?;

        debug!(queue = %self.queue_name, count = claimed.len(), "claimed messages");

        let mut batch = ReceivedBatch {
            envelopes: Vec::with_capacity(claimed.len()),
            failures: Vec::new(),
        };
        for record in claimed {
            let delete_tag = DeleteTag::new(record.delete_tag);
            match message::decode_body::<T>(&record.body) {
                Ok(payload) => batch
                    .envelopes
                    .push(Envelope::new(payload).with_delete_tag(delete_tag)),
                Err(err) => {
                    warn!(
                        queue = %self.queue_name,
                        delete_tag = %delete_tag,
                        error = %err,
                        "failed to decode claimed message body"
                    );
                    batch.failures.push(DecodeFailure {
                        delete_tag,
                        detail: err.to_string(),
                    });
                }
            }
        }
        Ok(batch)
    }

    async fn delete_inner(&self, delete_tag: &DeleteTag) -> Result<(), QueueError> {
        let now_ms = Utc::now().timestamp_millis();

        let mut tx = self.store.begin().await?;
        let record = RecordStore::find_by_delete_tag(&mut tx, delete_tag.as_str())
            .await?
            .ok_or_else(|| QueueError::NotFound {
                delete_tag: delete_tag.to_string(),
            })?;

        // Acknowledgment is only valid while the claim is still held; once
        // the visibility window lapses the message is up for redelivery and
        // this receipt is stale.
        let window_ends = record.updated_at + self.visibility_timeout.num_milliseconds();
        if now_ms >= window_ends {
            return Err(QueueError::Timing {
                delete_tag: delete_tag.to_string(),
            });
        }

        RecordStore::mark_deleted(&mut tx, delete_tag.as_str(), now_ms).await?;
        tx.commit().await?;

        debug!(queue = %self.queue_name, delete_tag = %delete_tag, "message acknowledged");
        Ok(())
    }
}

#[async_trait]
impl<T> QueueDriver<T> for RdbDriver<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn send(&self, deadline: Duration, payload: T) -> Result<(), QueueError> {
        bounded(deadline, self.send_inner(&payload)).await
    }

    async fn send_batch(&self, deadline: Duration, payloads: Vec<T>) -> Result<(), QueueError> {
        bounded(deadline, async {
            for payload in &payloads {
                self.send_inner(payload).await?;
            }
            Ok(())
        })
        .await
    }

    async fn receive(&self, deadline: Duration) -> Result<Envelope<T>, QueueError> {
        let mut batch = bounded(deadline, self.receives_inner(1)).await?;
        if let Some(envelope) = batch.envelopes.pop() {
            return Ok(envelope);
        }
        // The single claimed record failed to decode
        let failure = batch.failures.remove(0);
        Err(QueueError::Encoding(EncodingError::Decode {
            delete_tag: failure.delete_tag.to_string(),
            detail: failure.detail,
        }))
    }

    async fn receives(&self, deadline: Duration) -> Result<ReceivedBatch<T>, QueueError> {
        bounded(deadline, self.receives_inner(self.max_batch_size)).await
    }

    async fn delete(&self, deadline: Duration, envelope: &Envelope<T>) -> Result<(), QueueError> {
        let delete_tag = envelope.delete_tag().ok_or_else(|| QueueError::NotFound {
            delete_tag: String::new(),
        })?;
        bounded(deadline, self.delete_inner(delete_tag)).await
    }

    fn backend(&self) -> BackendType {
        BackendType::Rdb
    }
}
