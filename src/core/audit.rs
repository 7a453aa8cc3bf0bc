//! Audit sink implementations.
//!
//! Every routing decision, release, and per-item failure the loops produce
//! is recorded here; it doubles as the operator-attention channel for jobs
//! the engine could not route.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related job identifier.
    pub job_id: String,
    /// Loop that produced the event (`intake`, `sweep`, `api`).
    pub source: String,
    /// Action taken (route, defer, release, expire, policy_exhausted, store_failure, ...).
    pub action: String,
    /// Rule or guardrail id, when a decision was made.
    pub rule_id: Option<String>,
    /// Carbon reading in effect.
    pub carbon: Option<f64>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev. Clones share one buffer.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Events carrying the given action.
    #[must_use]
    pub fn events_with_action(&self, action: &str) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    job_id: impl Into<String>,
    source: impl Into<String>,
    action: impl Into<String>,
    rule_id: Option<String>,
    carbon: Option<f64>,
    detail: Option<String>,
) -> AuditEvent {
    let job_id = job_id.into();
    let source = source.into();
    let action = action.into();
    let created_at_ms = now_ms();
    AuditEvent {
        event_id: format!("{source}-{action}-{job_id}-{created_at_ms}"),
        job_id,
        source,
        action,
        rule_id,
        carbon,
        created_at_ms,
        detail,
    }
}
