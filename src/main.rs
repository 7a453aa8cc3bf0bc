//! Carbon-aware scheduler process.
//!
//! Runs the intake loop and the deferral sweep against an in-memory store
//! and a simulated carbon signal until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use carbon_scheduler::builders::{build_scheduler, build_signal};
use carbon_scheduler::config::SchedulerConfig;
use carbon_scheduler::core::{AppResult, AuditSink, InMemoryAuditSink};
use carbon_scheduler::infra::InMemoryStore;
use carbon_scheduler::util::init_tracing;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> AppResult<()> {
    init_tracing();

    let cfg = SchedulerConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("loading scheduler configuration")?;
    let policy = cfg
        .load_policy()
        .map_err(anyhow::Error::msg)
        .context("loading policy")?;
    tracing::info!(
        low = policy.thresholds.low,
        high = policy.thresholds.high,
        rules = policy.rules.len(),
        max_deferral_seconds = policy.max_deferral_seconds,
        "policy loaded"
    );

    let store = Arc::new(InMemoryStore::new());
    let signal = Arc::new(build_signal(&cfg)?);
    let audit: Arc<dyn AuditSink> = Arc::new(InMemoryAuditSink::new(cfg.audit_capacity));
    let scheduler = build_scheduler(&cfg, policy, store, signal, Some(audit))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await;
    Ok(())
}
