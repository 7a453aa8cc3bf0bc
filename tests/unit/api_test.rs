//! Tests for the API-facing helpers

use carbon_scheduler::core::{JobStatus, JobStore, PendingQueue, SchedulerError, Urgency};
use carbon_scheduler::infra::InMemoryStore;
use carbon_scheduler::runtime::{explain_job, health, submit_job, JobSubmission};

#[test]
fn test_submit_defaults_to_normal_urgency() {
    let store = InMemoryStore::new();
    let id = submit_job(&store, JobSubmission::default(), 42).unwrap();

    let job = store.get(&id).unwrap().unwrap();
    assert_eq!(job.urgency, Urgency::Normal);
    assert_eq!(job.job_type, "generic");
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.created_at_ms, 42);
    assert_eq!(store.dequeue_all().unwrap(), vec![id]);
}

#[test]
fn test_submit_parses_urgency_and_type() {
    let store = InMemoryStore::new();
    let req: JobSubmission =
        serde_json::from_str(r#"{"type": "fine-tune", "urgency": "Critical"}"#).unwrap();
    let id = submit_job(&store, req, 1).unwrap();

    let job = store.get(&id).unwrap().unwrap();
    assert_eq!(job.urgency, Urgency::Critical);
    assert_eq!(job.job_type, "fine-tune");
}

#[test]
fn test_submit_rejects_unknown_urgency() {
    let store = InMemoryStore::new();
    let req = JobSubmission {
        job_type: None,
        urgency: Some("asap".into()),
    };
    let err = submit_job(&store, req, 1).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidJob(_)));
    assert_eq!(store.pending_len(), 0);
}

#[test]
fn test_submitted_ids_are_unique() {
    let store = InMemoryStore::new();
    let a = submit_job(&store, JobSubmission::default(), 1).unwrap();
    let b = submit_job(&store, JobSubmission::default(), 1).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_explain_unknown_job() {
    let store = InMemoryStore::new();
    assert!(matches!(
        explain_job(&store, "missing"),
        Err(SchedulerError::InvalidJob(_))
    ));
}

#[test]
fn test_explain_fresh_job() {
    let store = InMemoryStore::new();
    let id = submit_job(&store, JobSubmission::default(), 1).unwrap();
    let view = explain_job(&store, &id).unwrap();
    assert_eq!(view.job_id, id);
    assert_eq!(view.mode, None);
    assert_eq!(view.policy_rule_id, None);
}

#[test]
fn test_health() {
    assert!(health().ok);
}
