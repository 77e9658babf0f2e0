//! Backend driver implementations.

pub mod rdb;
pub mod sqs;

pub use rdb::RdbDriver;
pub use sqs::SqsDriver;
