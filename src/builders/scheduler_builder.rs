//! Build the intake and sweep loops from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::SchedulerConfig;
use crate::core::{
    AuditSink, CarbonSignal, DeferralSweep, DeferredSet, IntakeLoop, JobStore, LaneQueue,
    PendingQueue, Policy, SchedulerError,
};
use crate::infra::SimulatedCarbonSignal;

/// Both loops over one store, with their polling intervals.
pub struct Scheduler<S, C: ?Sized> {
    /// Intake loop.
    pub intake: IntakeLoop<S, C>,
    /// Deferral sweep loop.
    pub sweep: DeferralSweep<S, C>,
    /// Intake polling interval.
    pub intake_interval: Duration,
    /// Sweep polling interval.
    pub sweep_interval: Duration,
}

/// Wire both loops to a shared policy, store, signal, and optional audit sink.
pub fn build_scheduler<S, C>(
    cfg: &SchedulerConfig,
    policy: Policy,
    store: Arc<S>,
    signal: Arc<C>,
    audit: Option<Arc<dyn AuditSink>>,
) -> Result<Scheduler<S, C>, SchedulerError>
where
    S: JobStore + PendingQueue + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;
    policy
        .validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("policy invalid: {e}")))?;

    let policy = Arc::new(policy);
    let mut intake = IntakeLoop::new(Arc::clone(&policy), Arc::clone(&store), Arc::clone(&signal));
    let mut sweep = DeferralSweep::new(policy, store, signal);
    if let Some(audit) = audit {
        intake = intake.with_audit(Arc::clone(&audit));
        sweep = sweep.with_audit(audit);
    }

    Ok(Scheduler {
        intake,
        sweep,
        intake_interval: cfg.intake_interval(),
        sweep_interval: cfg.sweep_interval(),
    })
}

/// Simulated carbon signal from the configured range and pin.
pub fn build_signal(cfg: &SchedulerConfig) -> Result<SimulatedCarbonSignal, SchedulerError> {
    Ok(SimulatedCarbonSignal::new(cfg.carbon_min, cfg.carbon_max)?.pinned(cfg.carbon_fixed))
}
