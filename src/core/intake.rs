//! Intake loop: drain pending arrivals, decide, route.
//!
//! One carbon sample is shared by every job processed in a tick. A failure
//! on one job never aborts the rest of the tick; the failing job goes back
//! on the pending queue in its pre-move state.

use std::sync::Arc;

use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::decision::{decide, JobAttributes};
use crate::core::job::{JobField, JobStatus, Mode};
use crate::core::policy::Policy;
use crate::core::signal::{sample, CarbonSignal};
use crate::core::store::{DeferredSet, JobStore, LaneQueue, PendingQueue};
use crate::core::SchedulerError;
use crate::util::clock::deadline_after;

const SOURCE: &str = "intake";

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeReport {
    /// Ids taken off the pending queue.
    pub drained: usize,
    /// Routed to the FAST lane.
    pub fast: usize,
    /// Routed to the ECO lane.
    pub eco: usize,
    /// Moved to the deferred set.
    pub deferred: usize,
    /// Left unrouted and flagged for an operator.
    pub flagged: usize,
    /// Already past `QUEUED`; ignored.
    pub skipped: usize,
    /// Store failures; re-enqueued for the next tick.
    pub failed: usize,
}

/// Intake loop over a shared store and a carbon signal.
pub struct IntakeLoop<S, C: ?Sized> {
    policy: Arc<Policy>,
    store: Arc<S>,
    signal: Arc<C>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<S, C: ?Sized> Clone for IntakeLoop<S, C> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            store: Arc::clone(&self.store),
            signal: Arc::clone(&self.signal),
            audit: self.audit.clone(),
        }
    }
}

impl<S, C> IntakeLoop<S, C>
where
    S: JobStore + PendingQueue + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    /// Create an intake loop.
    pub fn new(policy: Arc<Policy>, store: Arc<S>, signal: Arc<C>) -> Self {
        Self {
            policy,
            store,
            signal,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Process one tick at `now_ms`.
    ///
    /// Returns [`SchedulerError::SignalUnavailable`] without touching the
    /// pending queue when no reading can be taken.
    pub async fn tick(&self, now_ms: u128) -> Result<IntakeReport, SchedulerError> {
        let reading = sample(self.signal.as_ref()).await?;
        let ids = self.store.dequeue_all()?;
        let mut report = IntakeReport {
            drained: ids.len(),
            ..IntakeReport::default()
        };
        if ids.is_empty() {
            return Ok(report);
        }
        tracing::debug!(
            jobs = ids.len(),
            carbon = reading,
            band = %self.policy.band(reading),
            "intake tick"
        );

        for id in ids {
            match self.route(&id, reading, now_ms) {
                Ok(Some(Mode::Fast)) => report.fast += 1,
                Ok(Some(Mode::Eco)) => report.eco += 1,
                Ok(Some(Mode::Defer)) => report.deferred += 1,
                Ok(None) => report.skipped += 1,
                Err(err @ (SchedulerError::PolicyExhausted { .. } | SchedulerError::InvalidJob(_))) => {
                    if self.flag(&id, &err, reading) {
                        report.flagged += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Err(err) => {
                    self.retry(&id, &err);
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    fn route(&self, id: &str, reading: f64, now_ms: u128) -> Result<Option<Mode>, SchedulerError> {
        let job = self
            .store
            .get(id)?
            .ok_or_else(|| SchedulerError::InvalidJob(format!("no record for pending job {id}")))?;
        if job.status != JobStatus::Queued {
            tracing::warn!(job_id = %id, status = %job.status, "pending entry for job past QUEUED; ignoring");
            return Ok(None);
        }

        let decision = decide(
            JobAttributes {
                urgency: job.urgency,
                job_type: &job.job_type,
            },
            reading,
            &self.policy,
        )?;

        let (status, deadline) = if decision.mode == Mode::Defer {
            (
                JobStatus::Deferred,
                Some(deadline_after(now_ms, self.policy.max_deferral_seconds)),
            )
        } else {
            (JobStatus::Scheduled, None)
        };

        self.store.update(id, decision.to_fields(status, deadline))?;
        let moved = match deadline {
            Some(deadline_ms) => self.store.add(id.to_string(), deadline_ms),
            None => self.store.push(decision.mode, id.to_string()),
        };
        if let Err(err) = moved {
            if let Err(rollback) = self.store.update(id, job.scheduling_fields()) {
                tracing::error!(job_id = %id, error = %rollback, "failed to roll back decision fields");
            }
            return Err(err);
        }

        tracing::info!(
            job_id = %id,
            job_type = %job.job_type,
            urgency = %job.urgency,
            mode = %decision.mode,
            rule_id = %decision.policy_rule_id,
            guardrail = decision.guardrail_applied,
            carbon = reading,
            "job routed"
        );
        let action = if decision.mode == Mode::Defer { "defer" } else { "route" };
        self.record(id, action, Some(decision.policy_rule_id), Some(reading), Some(decision.decision_reason));
        Ok(Some(decision.mode))
    }

    /// Leave the job queued and mark it for an operator. Returns false when
    /// the flag could not be written and the job was re-enqueued instead.
    fn flag(&self, id: &str, err: &SchedulerError, reading: f64) -> bool {
        tracing::error!(job_id = %id, error = %err, carbon = reading, "job left unrouted");
        let action = match err {
            SchedulerError::PolicyExhausted { .. } => "policy_exhausted",
            _ => "invalid_job",
        };
        self.record(id, action, None, Some(reading), Some(err.to_string()));

        if matches!(err, SchedulerError::InvalidJob(_)) {
            return true;
        }
        match self
            .store
            .update(id, vec![JobField::Attention(Some(err.to_string()))])
        {
            Ok(()) => true,
            Err(store_err) => {
                self.retry(id, &store_err);
                false
            }
        }
    }

    fn retry(&self, id: &str, err: &SchedulerError) {
        tracing::error!(job_id = %id, error = %err, "intake failed; job re-enqueued for next tick");
        self.record(id, "store_failure", None, None, Some(err.to_string()));
        if let Err(requeue) = self.store.enqueue(id.to_string()) {
            tracing::error!(job_id = %id, error = %requeue, "failed to re-enqueue job");
            self.record(id, "requeue_failure", None, None, Some(requeue.to_string()));
        }
    }

    fn record(
        &self,
        id: &str,
        action: &str,
        rule_id: Option<String>,
        carbon: Option<f64>,
        detail: Option<String>,
    ) {
        if let Some(sink) = &self.audit {
            sink.record(build_audit_event(id, SOURCE, action, rule_id, carbon, detail));
        }
    }
}
