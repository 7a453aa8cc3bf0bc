//! Tests for configuration validation

use std::collections::HashMap;
use std::io::Write;

use carbon_scheduler::config::SchedulerConfig;
use carbon_scheduler::core::{Band, Mode};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.intake_interval_ms, 2_000);
    assert_eq!(cfg.carbon_min, 100);
    assert_eq!(cfg.carbon_max, 600);
}

#[test]
fn test_zero_interval_rejected() {
    let cfg = SchedulerConfig {
        sweep_interval_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_empty_carbon_range_rejected() {
    let cfg = SchedulerConfig {
        carbon_min: 700,
        ..SchedulerConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_from_lookup_reads_threshold_and_pin_vars() {
    let cfg = SchedulerConfig::from_lookup(lookup(&[
        ("LOW_THRESHOLD", "150"),
        ("HIGH_THRESHOLD", "350"),
        ("CARBON_FIXED", "420"),
        ("CARBON_INTAKE_INTERVAL_MS", "250"),
    ]))
    .unwrap();

    assert_eq!(cfg.low_threshold, Some(150.0));
    assert_eq!(cfg.high_threshold, Some(350.0));
    assert_eq!(cfg.carbon_fixed, Some(420));
    assert_eq!(cfg.intake_interval_ms, 250);
    assert_eq!(cfg.sweep_interval_ms, 5_000);
}

#[test]
fn test_from_lookup_rejects_garbage() {
    let err = SchedulerConfig::from_lookup(lookup(&[("CARBON_FIXED", "lots")])).unwrap_err();
    assert!(err.contains("CARBON_FIXED"), "{err}");
}

#[test]
fn test_from_json() {
    let json = r#"{ "intake_interval_ms": 500, "carbon_fixed": 150 }"#;
    let cfg = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.intake_interval_ms, 500);
    assert_eq!(cfg.carbon_fixed, Some(150));
    assert_eq!(cfg.audit_capacity, 10_000);
}

#[test]
fn test_builtin_policy_with_threshold_override() {
    let cfg = SchedulerConfig {
        low_threshold: Some(250.0),
        ..SchedulerConfig::default()
    };
    let policy = cfg.load_policy().unwrap();
    assert_eq!(policy.band(240.0), Band::Green);
    assert_eq!(policy.band(250.0), Band::Amber);
}

#[test]
fn test_override_that_inverts_thresholds_rejected() {
    let cfg = SchedulerConfig {
        low_threshold: Some(900.0),
        ..SchedulerConfig::default()
    };
    assert!(cfg.load_policy().is_err());
}

#[test]
fn test_policy_file_loaded() {
    let path = std::env::temp_dir().join(format!("carbon-policy-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{
            "thresholds": {{"low": 100, "high": 300}},
            "max_deferral_seconds": 120,
            "rules": [{{"id": "always-eco", "when": {{"urgency": "*", "band": "*"}}, "mode": "ECO"}}]
        }}"#
    )
    .unwrap();
    drop(file);

    let cfg = SchedulerConfig {
        policy_path: Some(path.clone()),
        ..SchedulerConfig::default()
    };
    let policy = cfg.load_policy().unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(policy.max_deferral_seconds, 120);
    assert_eq!(policy.rules[0].mode, Mode::Eco);
}

#[test]
fn test_missing_policy_file_reported() {
    let cfg = SchedulerConfig {
        policy_path: Some("/nonexistent/carbon-policy.json".into()),
        ..SchedulerConfig::default()
    };
    let err = cfg.load_policy().unwrap_err();
    assert!(err.contains("cannot read policy"), "{err}");
}

#[test]
fn test_shipped_policy_parses() {
    let cfg = SchedulerConfig {
        policy_path: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/policies/carbon-policy.json").into()),
        ..SchedulerConfig::default()
    };
    let policy = cfg.load_policy().unwrap();

    assert_eq!(policy.band(450.0), Band::Red);
    assert_eq!(policy.rules[0].id, "critical-any");
    assert_eq!(policy.rules[0].when.urgency, Some(carbon_scheduler::core::Urgency::Critical));
    assert_eq!(policy.rules[0].when.band, None);
}

#[test]
fn test_non_positive_pin_means_unpinned() {
    for raw in ["0", "-1", "-250"] {
        let cfg = SchedulerConfig::from_lookup(lookup(&[("CARBON_FIXED", raw)])).unwrap();
        assert_eq!(cfg.carbon_fixed, None, "CARBON_FIXED={raw}");
    }

    let cfg = SchedulerConfig::from_json_str(r#"{ "carbon_fixed": -5 }"#).unwrap();
    assert_eq!(cfg.carbon_fixed, None);
}

#[test]
fn test_oversized_pin_rejected() {
    let err = SchedulerConfig::from_lookup(lookup(&[("CARBON_FIXED", "99999999999")])).unwrap_err();
    assert!(err.contains("CARBON_FIXED"), "{err}");
}
