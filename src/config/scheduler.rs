//! Scheduler process configuration.
//!
//! Values come from JSON or from the environment (a `.env` file is loaded
//! first when present). The policy itself lives in its own JSON document
//! referenced by `policy_path`; without one the built-in band policy is used.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::Policy;

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Intake loop polling interval in milliseconds.
    #[serde(default = "default_intake_interval_ms")]
    pub intake_interval_ms: u64,
    /// Deferral sweep polling interval in milliseconds.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Policy document; the built-in policy is used when absent.
    #[serde(default)]
    pub policy_path: Option<PathBuf>,
    /// Override for the policy's low threshold.
    #[serde(default)]
    pub low_threshold: Option<f64>,
    /// Override for the policy's high threshold.
    #[serde(default)]
    pub high_threshold: Option<f64>,
    /// Pins the simulated signal. Zero or negative input leaves it unpinned.
    #[serde(default, deserialize_with = "pin_value")]
    pub carbon_fixed: Option<u32>,
    /// Lower bound of simulated readings.
    #[serde(default = "default_carbon_min")]
    pub carbon_min: u32,
    /// Upper bound of simulated readings.
    #[serde(default = "default_carbon_max")]
    pub carbon_max: u32,
    /// Events kept by the in-memory audit sink.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

const fn default_intake_interval_ms() -> u64 {
    2_000
}

const fn default_sweep_interval_ms() -> u64 {
    5_000
}

const fn default_carbon_min() -> u32 {
    100
}

const fn default_carbon_max() -> u32 {
    600
}

const fn default_audit_capacity() -> usize {
    10_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            intake_interval_ms: default_intake_interval_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            policy_path: None,
            low_threshold: None,
            high_threshold: None,
            carbon_fixed: None,
            carbon_min: default_carbon_min(),
            carbon_max: default_carbon_max(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.intake_interval_ms == 0 {
            return Err("intake_interval_ms must be greater than 0".into());
        }
        if self.sweep_interval_ms == 0 {
            return Err("sweep_interval_ms must be greater than 0".into());
        }
        if self.carbon_min > self.carbon_max {
            return Err(format!(
                "carbon_min ({}) must not exceed carbon_max ({})",
                self.carbon_min, self.carbon_max
            ));
        }
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be greater than 0".into());
        }
        for (name, value) in [("low_threshold", self.low_threshold), ("high_threshold", self.high_threshold)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(format!("{name} must be finite"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "CARBON_INTAKE_INTERVAL_MS")? {
            cfg.intake_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "CARBON_SWEEP_INTERVAL_MS")? {
            cfg.sweep_interval_ms = v;
        }
        cfg.policy_path = lookup("CARBON_POLICY_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        cfg.low_threshold = parse_var(&lookup, "LOW_THRESHOLD")?;
        cfg.high_threshold = parse_var(&lookup, "HIGH_THRESHOLD")?;
        cfg.carbon_fixed = match parse_var::<_, i64>(&lookup, "CARBON_FIXED")? {
            Some(raw) => positive_pin(raw).map_err(|e| format!("CARBON_FIXED={raw}: {e}"))?,
            None => None,
        };
        if let Some(v) = parse_var(&lookup, "CARBON_MIN")? {
            cfg.carbon_min = v;
        }
        if let Some(v) = parse_var(&lookup, "CARBON_MAX")? {
            cfg.carbon_max = v;
        }
        if let Some(v) = parse_var(&lookup, "CARBON_AUDIT_CAPACITY")? {
            cfg.audit_capacity = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Intake polling interval.
    #[must_use]
    pub const fn intake_interval(&self) -> Duration {
        Duration::from_millis(self.intake_interval_ms)
    }

    /// Sweep polling interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Load the policy document (or the built-in policy) and apply the
    /// threshold overrides.
    pub fn load_policy(&self) -> Result<Policy, String> {
        let policy = match &self.policy_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read policy {}: {e}", path.display()))?;
                Policy::from_json_str(&raw)
                    .map_err(|e| format!("policy {}: {e}", path.display()))?
            }
            None => Policy::default(),
        };
        policy.with_thresholds(self.low_threshold, self.high_threshold)
    }
}

// Values at or below zero mean "not pinned".
fn positive_pin(raw: i64) -> Result<Option<u32>, String> {
    if raw <= 0 {
        return Ok(None);
    }
    u32::try_from(raw).map(Some).map_err(|e| e.to_string())
}

fn pin_value<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<i64>::deserialize(deserializer)? {
        Some(raw) => positive_pin(raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{key}={raw}: {e}")),
        _ => Ok(None),
    }
}
