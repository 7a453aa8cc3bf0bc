//! Tokio drivers for the intake and sweep loops.
//!
//! Each loop ticks on its own interval. Shutdown is observed only between
//! ticks, so a tick in progress always runs to completion.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::builders::Scheduler;
use crate::core::{
    CarbonSignal, DeferralSweep, DeferredSet, IntakeLoop, JobStore, LaneQueue, PendingQueue,
    SchedulerError,
};
use crate::util::clock::now_ms;

impl<S, C> Scheduler<S, C>
where
    S: JobStore + PendingQueue + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    /// Run both loops until `shutdown` flips to `true`.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        tracing::info!(
            intake_ms = u64::try_from(self.intake_interval.as_millis()).unwrap_or(u64::MAX),
            sweep_ms = u64::try_from(self.sweep_interval.as_millis()).unwrap_or(u64::MAX),
            "scheduler started"
        );
        tokio::join!(
            run_intake(&self.intake, self.intake_interval, shutdown.clone()),
            run_sweep(&self.sweep, self.sweep_interval, shutdown),
        );
        tracing::info!("scheduler stopped");
    }
}

/// Drive the intake loop until shutdown.
pub async fn run_intake<S, C>(
    intake: &IntakeLoop<S, C>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: JobStore + PendingQueue + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !*shutdown.borrow() {
        tokio::select! {
            _ = timer.tick() => {
                match intake.tick(now_ms()).await {
                    Ok(report) if report.drained > 0 => tracing::info!(?report, "intake tick"),
                    Ok(_) => {}
                    Err(SchedulerError::SignalUnavailable(reason)) => {
                        tracing::warn!(%reason, "intake tick skipped: carbon signal unavailable");
                    }
                    Err(err) => tracing::error!(error = %err, "intake tick failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!("intake loop shutting down");
}

/// Drive the deferral sweep loop until shutdown.
pub async fn run_sweep<S, C>(
    sweep: &DeferralSweep<S, C>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    S: JobStore + LaneQueue + DeferredSet,
    C: CarbonSignal + ?Sized,
{
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !*shutdown.borrow() {
        tokio::select! {
            _ = timer.tick() => {
                match sweep.tick(now_ms()).await {
                    Ok(report) if report.scanned > 0 => tracing::info!(?report, "sweep tick"),
                    Ok(_) => {}
                    Err(SchedulerError::SignalUnavailable(reason)) => {
                        tracing::warn!(%reason, "sweep tick skipped: carbon signal unavailable");
                    }
                    Err(err) => tracing::error!(error = %err, "sweep tick failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!("sweep loop shutting down");
}
