//! Tests for the driver contract and factory.

use super::*;
use crate::config::RdbConfig;
use crate::message::QueueName;
use tempfile::TempDir;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_factory_creates_rdb_driver() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.db");
    let config = RdbConfig::new(path.to_str().unwrap(), QueueName::new("jobs").unwrap())
        .unwrap()
        .with_visibility_timeout(Duration::milliseconds(100));

    let driver = QueueDriverFactory::create::<String>(DriverConfig::Rdb(config))
        .await
        .unwrap();
    assert_eq!(driver.backend(), BackendType::Rdb);

    // Smoke the contract through the trait object
    tokio_test::assert_ok!(driver.send(Duration::seconds(5), "hello".to_string()).await);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let envelope = driver.receive(Duration::seconds(5)).await.unwrap();
    assert_eq!(envelope.payload(), "hello");
}

#[tokio::test]
async fn test_bounded_passes_result_through() {
    let value = bounded(Duration::seconds(1), async { Ok::<_, QueueError>(7) })
        .await
        .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn test_bounded_rejects_expired_deadline() {
    let result = bounded(Duration::milliseconds(-1), async { Ok::<_, QueueError>(()) }).await;
    assert!(matches!(result, Err(QueueError::Timeout { .. })));
}

#[tokio::test]
async fn test_bounded_expires() {
    let result = bounded(Duration::milliseconds(10), async {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Ok::<_, QueueError>(())
    })
    .await;
    assert!(matches!(result, Err(QueueError::Timeout { .. })));
}
