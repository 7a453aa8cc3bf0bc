//! Tests for error types

use carbon_scheduler::core::{Band, SchedulerError, Urgency};

#[test]
fn test_policy_exhausted_error() {
    let err = SchedulerError::PolicyExhausted {
        urgency: Urgency::Normal,
        band: Band::Red,
    };
    assert_eq!(
        format!("{err}"),
        "policy exhausted: no rule matches urgency `normal` in band `red`"
    );
}

#[test]
fn test_signal_unavailable_error() {
    let err = SchedulerError::SignalUnavailable("timeout".to_string());
    assert_eq!(format!("{err}"), "carbon signal unavailable: timeout");
}

#[test]
fn test_store_failure_error() {
    let err = SchedulerError::StoreFailure("connection reset".to_string());
    assert_eq!(format!("{err}"), "store failure: connection reset");
}

#[test]
fn test_invalid_job_error() {
    let err = SchedulerError::InvalidJob("unknown urgency `asap`".to_string());
    assert_eq!(format!("{err}"), "invalid job: unknown urgency `asap`");
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("bad".to_string());
    assert_eq!(format!("{err}"), "invalid configuration: bad");
}
