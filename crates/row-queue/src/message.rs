//! Message envelope, delete tags, and queue identifiers.

use crate::error::{ConfigurationError, EncodingError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated queue name with length and character restrictions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::Missing {
                key: "queue_name".to_string(),
            });
        }

        if name.len() > 128 {
            return Err(ConfigurationError::Invalid {
                key: "queue_name".to_string(),
                message: "must be at most 128 characters".to_string(),
            });
        }

        // ASCII alphanumeric plus separators; keeps names portable across backends
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ConfigurationError::Invalid {
                key: "queue_name".to_string(),
                message: "only ASCII alphanumeric, '-', '_' and '.' allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Opaque token identifying one enqueued message for acknowledgment.
///
/// Generated once when the record is created and stable across redeliveries.
/// The managed-queue adapter maps the service's native receipt handle onto
/// this type instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteTag(String);

impl DeleteTag {
    /// Generate a fresh random tag
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing tag value (store row or provider receipt handle)
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get tag as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeleteTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Wire Format
// ============================================================================

/// On-the-wire body layout: a single `body` field holding the caller's value.
///
/// The delete tag is store-local metadata and is never part of the
/// serialized payload.
#[derive(Serialize, Deserialize)]
struct WireBody<T> {
    body: T,
}

/// Serialize a payload into the wire body format
pub(crate) fn encode_body<T: Serialize>(payload: &T) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(&WireBody { body: payload })?)
}

/// Deserialize a wire body back into a payload
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, EncodingError> {
    let wire: WireBody<T> = serde_json::from_str(body)?;
    Ok(wire.body)
}

// ============================================================================
// Envelope and Receive Report
// ============================================================================

/// Generic holder pairing a caller payload with its delete tag.
///
/// The tag is unset until the envelope comes back from a successful receive;
/// acknowledging a message requires an envelope carrying its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    payload: T,
    delete_tag: Option<DeleteTag>,
}

impl<T> Envelope<T> {
    /// Create new envelope with payload and no delete tag
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            delete_tag: None,
        }
    }

    /// Attach the delete tag assigned at receipt time
    pub fn with_delete_tag(mut self, tag: DeleteTag) -> Self {
        self.delete_tag = Some(tag);
        self
    }

    /// Get payload reference
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the envelope, returning the payload
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Get delete tag, if one has been assigned
    pub fn delete_tag(&self) -> Option<&DeleteTag> {
        self.delete_tag.as_ref()
    }
}

/// Per-item report for a claimed record whose body failed to decode.
///
/// The record was claimed (its receive count advanced) before decoding, so
/// the tag is included to let the caller delete or abandon it deliberately.
#[derive(Debug, Clone)]
pub struct DecodeFailure {
    pub delete_tag: DeleteTag,
    pub detail: String,
}

/// Result of one receive call: decoded envelopes plus per-item decode failures
#[derive(Debug, Clone)]
pub struct ReceivedBatch<T> {
    pub envelopes: Vec<Envelope<T>>,
    pub failures: Vec<DecodeFailure>,
}

impl<T> ReceivedBatch<T> {
    /// Total number of records claimed by the call
    pub fn claimed(&self) -> usize {
        self.envelopes.len() + self.failures.len()
    }
}
