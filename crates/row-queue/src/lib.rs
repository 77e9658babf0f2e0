//! # Row Queue
//!
//! Generic, type-parameterized message-queue runtime with at-least-once
//! delivery over interchangeable backends.
//!
//! The core is the self-hosted polling engine ([`drivers::rdb`]): it
//! reimplements visibility-timeout and receipt-handle delivery on a plain
//! SQLite row table, providing concurrency-safe claiming, bounded
//! redelivery, and acknowledgment entirely through store transactions. An
//! AWS SQS adapter ([`drivers::sqs`]) forwards the same contract to the
//! managed service.
//!
//! ## Module Organization
//!
//! - [`error`] - Error taxonomy for all queue operations
//! - [`message`] - Envelopes, delete tags, and queue identifiers
//! - [`config`] - Backend selection and tunables
//! - [`store`] - SQLite record store used by the polling engine
//! - [`driver`] - The backend-agnostic driver contract and factory
//! - [`drivers`] - The polling engine and the SQS adapter

// Module declarations
pub mod config;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod message;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use config::{BackendType, DriverConfig, QueueTuning, RdbConfig, SqsConfig};
pub use driver::{QueueDriver, QueueDriverFactory};
pub use drivers::{RdbDriver, SqsDriver};
pub use error::{ConfigurationError, EncodingError, QueueError};
pub use message::{DecodeFailure, DeleteTag, Envelope, QueueName, ReceivedBatch};
pub use store::{QueueRecord, RecordStore};
