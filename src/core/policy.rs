//! Immutable policy model: thresholds, ordered rules, guardrail parameters.
//!
//! A policy is loaded once at process start and passed by reference into
//! the decision engine. Rules are evaluated first-match in authored order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::decision::{
    GREEN_WINDOW_RELEASE, GUARDRAIL_CRITICAL_OVERRIDE, GUARDRAIL_MAX_DEFERRAL,
};
use crate::core::job::{Mode, Urgency};

/// Carbon-intensity classification derived from thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Below the low threshold.
    Green,
    /// Between the thresholds, both bounds inclusive.
    Amber,
    /// Above the high threshold.
    Red,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Amber => write!(f, "amber"),
            Self::Red => write!(f, "red"),
        }
    }
}

impl FromStr for Band {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "amber" => Ok(Self::Amber),
            "red" => Ok(Self::Red),
            other => Err(format!("unknown band `{other}`")),
        }
    }
}

/// Carbon-intensity bounds (gCO2/kWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Readings strictly below this are green.
    pub low: f64,
    /// Readings strictly above this are red.
    pub high: f64,
}

impl Thresholds {
    /// Classify a reading. Exactly `low` and exactly `high` are amber.
    #[must_use]
    pub fn band(&self, reading: f64) -> Band {
        if reading < self.low {
            Band::Green
        } else if reading > self.high {
            Band::Red
        } else {
            Band::Amber
        }
    }

    /// Validate bounds.
    pub fn validate(&self) -> Result<(), String> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err("thresholds must be finite".into());
        }
        if self.low >= self.high {
            return Err(format!(
                "thresholds.low ({}) must be below thresholds.high ({})",
                self.low, self.high
            ));
        }
        Ok(())
    }
}

/// Predicate over `(urgency, band)`. `None` matches anything.
///
/// Unknown keys are rejected so a misspelled predicate never widens into a
/// wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleMatch {
    /// Required urgency, or any.
    #[serde(default, deserialize_with = "wildcard")]
    pub urgency: Option<Urgency>,
    /// Required band, or any.
    #[serde(default, deserialize_with = "wildcard")]
    pub band: Option<Band>,
}

impl RuleMatch {
    /// Whether this predicate accepts the pair.
    #[must_use]
    pub fn matches(&self, urgency: Urgency, band: Band) -> bool {
        self.urgency.is_none_or(|u| u == urgency) && self.band.is_none_or(|b| b == band)
    }
}

// "*", "any", null, or an omitted key all mean "match anything".
fn wildcard<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("*") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("any") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One ordered policy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Identifier written onto jobs as `policy_rule_id`.
    pub id: String,
    /// Predicate over `(urgency, band)`.
    #[serde(default)]
    pub when: RuleMatch,
    /// Resulting mode.
    pub mode: Mode,
}

impl Rule {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        urgency: Option<Urgency>,
        band: Option<Band>,
        mode: Mode,
    ) -> Self {
        Self {
            id: id.into(),
            when: RuleMatch { urgency, band },
            mode,
        }
    }
}

/// Parsed, validated policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Band thresholds.
    pub thresholds: Thresholds,
    /// Rules in authored order; first match wins.
    pub rules: Vec<Rule>,
    /// Upper bound on how long any job stays deferred.
    pub max_deferral_seconds: u64,
}

const RESERVED_RULE_IDS: [&str; 3] = [
    GUARDRAIL_CRITICAL_OVERRIDE,
    GUARDRAIL_MAX_DEFERRAL,
    GREEN_WINDOW_RELEASE,
];

impl Policy {
    /// Build and validate a policy.
    pub fn new(
        thresholds: Thresholds,
        rules: Vec<Rule>,
        max_deferral_seconds: u64,
    ) -> Result<Self, String> {
        let policy = Self {
            thresholds,
            rules,
            max_deferral_seconds,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Validate thresholds, rules, and guardrail parameters.
    pub fn validate(&self) -> Result<(), String> {
        self.thresholds.validate()?;
        if self.max_deferral_seconds == 0 {
            return Err("max_deferral_seconds must be greater than 0".into());
        }
        if self.rules.is_empty() {
            return Err("at least one rule must be defined".into());
        }
        let mut seen = HashSet::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.id.trim().is_empty() {
                return Err(format!("rule #{idx} has an empty id"));
            }
            if RESERVED_RULE_IDS.contains(&rule.id.as_str()) {
                return Err(format!("rule id `{}` is reserved", rule.id));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(format!("duplicate rule id `{}`", rule.id));
            }
        }
        Ok(())
    }

    /// Parse a policy from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let policy: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Replace the thresholds, re-validating the result.
    pub fn with_thresholds(mut self, low: Option<f64>, high: Option<f64>) -> Result<Self, String> {
        if let Some(low) = low {
            self.thresholds.low = low;
        }
        if let Some(high) = high {
            self.thresholds.high = high;
        }
        self.validate()?;
        Ok(self)
    }

    /// Band for a reading under this policy.
    #[must_use]
    pub fn band(&self, reading: f64) -> Band {
        self.thresholds.band(reading)
    }

    /// First rule matching `(urgency, band)`, in authored order.
    #[must_use]
    pub fn first_match(&self, urgency: Urgency, band: Band) -> Option<&Rule> {
        self.rules.iter().find(|r| r.when.matches(urgency, band))
    }
}

impl Default for Policy {
    /// Band-only policy: green runs fast, red runs eco, amber defers.
    fn default() -> Self {
        Self {
            thresholds: Thresholds {
                low: 200.0,
                high: 400.0,
            },
            rules: vec![
                Rule::new("green-fast", None, Some(Band::Green), Mode::Fast),
                Rule::new("red-eco", None, Some(Band::Red), Mode::Eco),
                Rule::new("amber-defer", None, Some(Band::Amber), Mode::Defer),
            ],
            max_deferral_seconds: 1800,
        }
    }
}
