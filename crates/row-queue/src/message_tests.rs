//! Tests for message types and the wire body format.

use super::*;

#[test]
fn test_queue_name_accepts_valid_names() {
    for name in ["jobs", "jobs-high", "jobs_low", "jobs.v2", "Q1"] {
        assert!(QueueName::new(name).is_ok(), "rejected {name}");
    }
}

#[test]
fn test_queue_name_rejects_invalid_names() {
    assert!(matches!(
        QueueName::new(""),
        Err(ConfigurationError::Missing { .. })
    ));
    assert!(matches!(
        QueueName::new("has space"),
        Err(ConfigurationError::Invalid { .. })
    ));
    assert!(matches!(
        QueueName::new("has/slash"),
        Err(ConfigurationError::Invalid { .. })
    ));
    assert!(matches!(
        QueueName::new("x".repeat(129)),
        Err(ConfigurationError::Invalid { .. })
    ));
}

#[test]
fn test_delete_tags_are_unique() {
    assert_ne!(DeleteTag::generate(), DeleteTag::generate());
}

#[test]
fn test_envelope_tag_assignment() {
    let envelope = Envelope::new("payload");
    assert_eq!(envelope.delete_tag(), None);

    let tag = DeleteTag::generate();
    let envelope = envelope.with_delete_tag(tag.clone());
    assert_eq!(envelope.delete_tag(), Some(&tag));
    assert_eq!(*envelope.payload(), "payload");
}

#[test]
fn test_wire_body_layout() {
    let body = encode_body(&"hello").unwrap();
    assert_eq!(body, r#"{"body":"hello"}"#);
}

#[test]
fn test_wire_body_round_trip() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Job {
        task: String,
        attempts: u32,
    }

    let job = Job {
        task: "resize".to_string(),
        attempts: 3,
    };
    let body = encode_body(&job).unwrap();
    let decoded: Job = decode_body(&body).unwrap();
    assert_eq!(decoded, job);
}

#[test]
fn test_wire_body_decode_failure() {
    let result = decode_body::<u32>("not json at all");
    assert!(matches!(result, Err(EncodingError::Json(_))));
}

#[test]
fn test_received_batch_claimed_count() {
    let batch = ReceivedBatch {
        envelopes: vec![Envelope::new(1u8), Envelope::new(2u8)],
        failures: vec![DecodeFailure {
            delete_tag: DeleteTag::generate(),
            detail: "bad body".to_string(),
        }],
    };
    assert_eq!(batch.claimed(), 3);
}
