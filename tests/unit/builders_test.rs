//! Tests for builders

use std::sync::Arc;
use std::time::Duration;

use carbon_scheduler::builders::{build_scheduler, build_signal};
use carbon_scheduler::config::SchedulerConfig;
use carbon_scheduler::core::{CarbonSignal, Policy, SchedulerError};
use carbon_scheduler::infra::{FixedCarbonSignal, InMemoryStore};

#[test]
fn test_build_scheduler_from_defaults() {
    let cfg = SchedulerConfig {
        intake_interval_ms: 100,
        sweep_interval_ms: 300,
        ..SchedulerConfig::default()
    };
    let scheduler = build_scheduler(
        &cfg,
        Policy::default(),
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedCarbonSignal::new(300.0)),
        None,
    )
    .unwrap();
    assert_eq!(scheduler.intake_interval, Duration::from_millis(100));
    assert_eq!(scheduler.sweep_interval, Duration::from_millis(300));
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let cfg = SchedulerConfig {
        intake_interval_ms: 0,
        ..SchedulerConfig::default()
    };
    let result = build_scheduler(
        &cfg,
        Policy::default(),
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedCarbonSignal::new(300.0)),
        None,
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_build_scheduler_rejects_invalid_policy() {
    let mut policy = Policy::default();
    policy.rules.clear();
    let result = build_scheduler(
        &SchedulerConfig::default(),
        policy,
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedCarbonSignal::new(300.0)),
        None,
    );
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_build_signal_honours_pin() {
    let cfg = SchedulerConfig {
        carbon_fixed: Some(321),
        ..SchedulerConfig::default()
    };
    let signal = build_signal(&cfg).unwrap();
    assert_eq!(signal.read().await.unwrap(), 321.0);
}
