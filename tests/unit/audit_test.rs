//! Tests for audit sink

use carbon_scheduler::core::{build_audit_event, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        "job1",
        "intake",
        "route",
        Some("flex-green".to_string()),
        Some(150.0),
        None,
    );

    sink.record(event);
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].job_id, "job1");
    assert_eq!(events[0].source, "intake");
    assert_eq!(events[0].rule_id.as_deref(), Some("flex-green"));
    assert!(events[0].event_id.starts_with("intake-route-job1-"));
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("job1", "intake", "route", None, None, None));
    sink.record(build_audit_event("job2", "intake", "route", None, None, None));
    sink.record(build_audit_event("job3", "sweep", "release", None, None, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job_id, "job2"); // First one popped
    assert_eq!(events[1].job_id, "job3");
}

#[test]
fn test_clones_share_buffer() {
    let sink = InMemoryAuditSink::new(10);
    let handle = sink.clone();

    sink.record(build_audit_event("job1", "sweep", "expire", None, None, None));
    sink.record(build_audit_event("job2", "sweep", "release", None, None, None));

    assert_eq!(handle.events().len(), 2);
    assert_eq!(handle.events_with_action("expire").len(), 1);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let sink = InMemoryAuditSink::new(0);

    sink.record(build_audit_event("job1", "intake", "route", None, None, None));
    sink.record(build_audit_event("job2", "sweep", "expire", None, None, None));

    assert!(sink.events().is_empty());
}
