//! Tests for error types.

use super::*;

#[test]
fn test_error_transience() {
    assert!(QueueError::NoMessages {
        queue: "jobs".to_string(),
    }
    .is_transient());

    assert!(QueueError::Timeout {
        deadline: Duration::seconds(1),
    }
    .is_transient());

    assert!(!QueueError::DuplicateMessage {
        queue: "jobs".to_string(),
    }
    .is_transient());

    assert!(!QueueError::Timing {
        delete_tag: "tag".to_string(),
    }
    .is_transient());

    assert!(!QueueError::NotFound {
        delete_tag: "tag".to_string(),
    }
    .is_transient());
}

#[test]
fn test_retry_suggestions() {
    let no_messages = QueueError::NoMessages {
        queue: "jobs".to_string(),
    };
    assert_eq!(no_messages.retry_after(), Some(Duration::seconds(1)));

    let not_found = QueueError::NotFound {
        delete_tag: "tag".to_string(),
    };
    assert_eq!(not_found.retry_after(), None);
}

#[test]
fn test_error_display() {
    let err = QueueError::NoMessages {
        queue: "jobs".to_string(),
    };
    assert_eq!(err.to_string(), "No messages available on queue 'jobs'");

    let err = QueueError::Configuration(ConfigurationError::Missing {
        key: "database_path".to_string(),
    });
    assert!(err.to_string().contains("database_path"));
}
