//! AWS SQS adapter for the driver contract.
//!
//! Pure request/response translation: each operation maps onto the matching
//! SQS API call and the service's native receipt handle is carried as the
//! delete tag. Visibility timeouts, redelivery counting, and claim
//! exclusivity all live in the managed service, so this adapter holds no
//! state machine of its own.

use crate::config::{BackendType, SqsConfig};
use crate::driver::{bounded, QueueDriver};
use crate::error::{EncodingError, QueueError};
use crate::message::{self, DecodeFailure, DeleteTag, Envelope, QueueName, ReceivedBatch};
use async_trait::async_trait;
use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "sqs_tests.rs"]
mod tests;

/// SQS caps ReceiveMessage at ten messages per call
const SQS_RECEIVE_CAP: u32 = 10;

/// Managed-queue driver delegating to AWS SQS
pub struct SqsDriver<T> {
    client: aws_sdk_sqs::Client,
    queue_url: String,
    queue_name: QueueName,
    visibility_timeout: Duration,
    max_batch_size: u32,
    _payload: PhantomData<fn() -> T>,
}

impl<T> SqsDriver<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a driver from the ambient AWS environment and `config`
    pub async fn connect(config: SqsConfig) -> Result<Self, QueueError> {
        config.validate()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        let client = aws_sdk_sqs::Client::new(&sdk_config);

        Ok(Self::with_client(client, config))
    }

    /// Build a driver around an existing SQS client
    pub fn with_client(client: aws_sdk_sqs::Client, config: SqsConfig) -> Self {
        Self {
            client,
            queue_url: config.queue_url,
            queue_name: config.queue_name,
            visibility_timeout: config.tuning.visibility_timeout,
            max_batch_size: config.tuning.max_batch_size.min(SQS_RECEIVE_CAP),
            _payload: PhantomData,
        }
    }

    async fn send_inner(&self, payload: &T) -> Result<(), QueueError> {
        let body = message::encode_body(payload)?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(provider_error)?;

        debug!(queue = %self.queue_name, "message forwarded to SQS");
        Ok(())
    }

    async fn receives_inner(&self, limit: u32) -> Result<ReceivedBatch<T>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(limit as i32)
            .visibility_timeout(self.visibility_timeout.num_seconds() as i32)
            .send()
            .await
            .map_err(provider_error)?;

        let messages = output.messages.unwrap_or_default();
        if messages.is_empty() {
            // The contract never reports "nothing available" as a success
            return Err(QueueError::NoMessages {
                queue: self.queue_name.to_string(),
            });
        }

        let mut batch = ReceivedBatch {
            envelopes: Vec::with_capacity(messages.len()),
            failures: Vec::new(),
        };
        for sqs_message in messages {
            let delete_tag = DeleteTag::new(sqs_message.receipt_handle.unwrap_or_default());
            let body = sqs_message.body.unwrap_or_default();
            match message::decode_body::<T>(&body) {
                Ok(payload) => batch
                    .envelopes
                    .push(Envelope::new(payload).with_delete_tag(delete_tag)),
                Err(err) => {
                    warn!(
                        queue = %self.queue_name,
                        delete_tag = %delete_tag,
                        error = %err,
                        "failed to decode SQS message body"
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
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(delete_tag.as_str())
            .send()
            .await
            .map_err(provider_error)?;

        debug!(queue = %self.queue_name, "message acknowledged on SQS");
        Ok(())
    }
}

#[async_trait]
impl<T> QueueDriver<T> for SqsDriver<T>
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
        BackendType::Sqs
    }
}

/// Map an SDK failure onto the provider error variant
fn provider_error<E>(err: SdkError<E>) -> QueueError
where
    E: std::error::Error + Send + Sync + 'static,
{
    QueueError::Provider {
        provider: "AwsSqs".to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}
