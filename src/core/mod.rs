//! Core scheduling model, decision engine, and the two polling loops.

pub mod audit;
pub mod decision;
pub mod error;
pub mod intake;
pub mod job;
pub mod policy;
pub mod signal;
pub mod store;
pub mod sweep;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink};
pub use decision::{
    apply_critical_override, apply_max_deferral, decide, deadline_elapsed, green_window_release,
    release_decision, Decision, JobAttributes, GREEN_WINDOW_RELEASE, GUARDRAIL_CRITICAL_OVERRIDE,
    GUARDRAIL_MAX_DEFERRAL,
};
pub use error::{AppResult, SchedulerError};
pub use intake::{IntakeLoop, IntakeReport};
pub use job::{Job, JobField, JobId, JobStatus, Mode, Urgency};
pub use policy::{Band, Policy, Rule, RuleMatch, Thresholds};
pub use signal::CarbonSignal;
pub use store::{DeferredSet, JobStore, LaneQueue, PendingQueue};
pub use sweep::{DeferralSweep, SweepReport};
