//! Deferral sweep loop: release deferred jobs on a green window or when
//! their deadline elapses.
//!
//! A green reading releases the whole deferred set to FAST in one tick.
//! Outside a green window each job is checked on its own deadline and
//! expired jobs go to ECO under the max-deferral guardrail.

use std::sync::Arc;

use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::decision::{release_decision, Decision, GREEN_WINDOW_RELEASE};
use crate::core::job::{Job, JobStatus};
use crate::core::policy::{Band, Policy};
use crate::core::signal::{sample, CarbonSignal};
use crate::core::store::{DeferredSet, JobStore, LaneQueue};
use crate::core::SchedulerError;

const SOURCE: &str = "sweep";

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Deferred entries seen.
    pub scanned: usize,
    /// Released to FAST by a green window.
    pub released_green: usize,
    /// Released to ECO by the max-deferral guardrail.
    pub expired: usize,
    /// Left deferred.
    pub remaining: usize,
    /// Entries whose record was missing or no longer deferred; dropped.
    pub stale: usize,
    /// Store failures; left deferred for the next tick.
    pub failed: usize,
}

enum Released {
    Moved,
    Stale,
}

/// Sweep loop over a shared store and a carbon signal.
pub struct DeferralSweep<S, C: ?Sized> {
    policy: Arc<Policy>,
    store: Arc<S>,
    signal: Arc<C>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<S, C: ?Sized> Clone for DeferralSweep<S, C> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            store: Arc::clone(&self.store),
            signal: Arc::clone(&self.signal),
            audit: self.audit.clone(),
        }
    }
}

impl<S, C> DeferralSweep<S, C>
where
    S: JobStore + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    /// Create a sweep loop.
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
    pub async fn tick(&self, now_ms: u128) -> Result<SweepReport, SchedulerError> {
        let reading = sample(self.signal.as_ref()).await?;
        let entries = self.store.list_all()?;
        let mut report = SweepReport {
            scanned: entries.len(),
            ..SweepReport::default()
        };
        if entries.is_empty() {
            return Ok(report);
        }

        let band = self.policy.band(reading);
        if band == Band::Green {
            tracing::info!(jobs = entries.len(), carbon = reading, "green window; releasing deferred set");
        }

        for (id, deadline_ms) in entries {
            let Some(decision) = release_decision(reading, &self.policy, deadline_ms, now_ms) else {
                report.remaining += 1;
                continue;
            };
            match self.release(&id, deadline_ms, &decision) {
                Ok(Released::Moved) if decision.policy_rule_id == GREEN_WINDOW_RELEASE => {
                    report.released_green += 1;
                }
                Ok(Released::Moved) => report.expired += 1,
                Ok(Released::Stale) => report.stale += 1,
                Err(err) => {
                    tracing::error!(job_id = %id, error = %err, "release failed; job stays deferred");
                    self.record(&id, "store_failure", None, Some(reading), Some(err.to_string()));
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    fn release(
        &self,
        id: &str,
        deadline_ms: u128,
        decision: &Decision,
    ) -> Result<Released, SchedulerError> {
        let Some(job) = self.store.get(id)? else {
            tracing::warn!(job_id = %id, "deferred entry has no job record; dropping");
            self.store.remove(id)?;
            return Ok(Released::Stale);
        };
        if job.status != JobStatus::Deferred {
            tracing::warn!(job_id = %id, status = %job.status, "deferred entry for job no longer deferred; dropping");
            self.store.remove(id)?;
            return Ok(Released::Stale);
        }
        if !self.store.remove(id)? {
            return Ok(Released::Stale);
        }

        if let Err(err) = self
            .store
            .update(id, decision.to_fields(JobStatus::Scheduled, None))
        {
            self.restore(id, deadline_ms, None);
            return Err(err);
        }
        if let Err(err) = self.store.push(decision.mode, id.to_string()) {
            self.restore(id, deadline_ms, Some(&job));
            return Err(err);
        }

        tracing::info!(
            job_id = %id,
            mode = %decision.mode,
            rule_id = %decision.policy_rule_id,
            carbon = decision.carbon_intensity_at_decision,
            "deferred job released"
        );
        let action = if decision.guardrail_applied { "expire" } else { "release" };
        self.record(
            id,
            action,
            Some(decision.policy_rule_id.clone()),
            Some(decision.carbon_intensity_at_decision),
            Some(decision.decision_reason.clone()),
        );
        Ok(Released::Moved)
    }

    // Put a job back into the deferred set after a failed release.
    fn restore(&self, id: &str, deadline_ms: u128, snapshot: Option<&Job>) {
        if let Some(job) = snapshot {
            if let Err(err) = self.store.update(id, job.scheduling_fields()) {
                tracing::error!(job_id = %id, error = %err, "failed to roll back release fields");
            }
        }
        if let Err(err) = self.store.add(id.to_string(), deadline_ms) {
            tracing::error!(job_id = %id, error = %err, "failed to restore deferred entry");
            self.record(id, "restore_failure", None, None, Some(err.to_string()));
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
