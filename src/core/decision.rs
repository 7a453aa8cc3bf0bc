//! Decision engine and guardrail layer.
//!
//! [`decide`] is a pure function of job attributes, a carbon reading, and the
//! policy. It scans the rules first-match, then runs the guardrails over the
//! tentative result. A triggered guardrail replaces the rule's mode, rule id,
//! and reason outright.
//!
//! Release-time decisions for deferred jobs come from [`release_decision`],
//! which applies the green-window release and the max-deferral guardrail.

use serde::{Deserialize, Serialize};

use crate::core::error::SchedulerError;
use crate::core::job::{JobField, JobStatus, Mode, Urgency};
use crate::core::policy::{Band, Policy};

/// Rule id written when a critical job's tentative deferral is overridden.
pub const GUARDRAIL_CRITICAL_OVERRIDE: &str = "GUARDRAIL_CRITICAL_OVERRIDE";
/// Rule id written when a deferred job outlives its deadline.
pub const GUARDRAIL_MAX_DEFERRAL: &str = "GUARDRAIL_MAX_DEFERRAL";
/// Rule id written when a green sweep releases the deferred set.
pub const GREEN_WINDOW_RELEASE: &str = "GREEN_WINDOW_RELEASE";

/// Job attributes the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobAttributes<'a> {
    /// Urgency class; the only attribute rules branch on.
    pub urgency: Urgency,
    /// Classification string, carried into reasons only.
    pub job_type: &'a str,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Chosen mode.
    pub mode: Mode,
    /// Rule or guardrail id that produced the mode.
    pub policy_rule_id: String,
    /// Human-readable explanation.
    pub decision_reason: String,
    /// Reading the decision was made with.
    pub carbon_intensity_at_decision: f64,
    /// Whether a guardrail replaced the rule output.
    pub guardrail_applied: bool,
}

impl Decision {
    /// Field updates recording this decision on a job with the given status
    /// and deferral deadline. Clears any operator attention flag.
    #[must_use]
    pub fn to_fields(&self, status: JobStatus, defer_deadline_ms: Option<u128>) -> Vec<JobField> {
        vec![
            JobField::Status(status),
            JobField::Mode(Some(self.mode)),
            JobField::PolicyRuleId(Some(self.policy_rule_id.clone())),
            JobField::DecisionReason(Some(self.decision_reason.clone())),
            JobField::CarbonIntensity(Some(self.carbon_intensity_at_decision)),
            JobField::DeferDeadline(defer_deadline_ms),
            JobField::Attention(None),
        ]
    }
}

/// Evaluate the policy for one job.
///
/// Fails with [`SchedulerError::PolicyExhausted`] when no rule matches.
pub fn decide(
    job: JobAttributes<'_>,
    reading: f64,
    policy: &Policy,
) -> Result<Decision, SchedulerError> {
    let band = policy.band(reading);
    let rule = policy
        .first_match(job.urgency, band)
        .ok_or(SchedulerError::PolicyExhausted {
            urgency: job.urgency,
            band,
        })?;

    let tentative = Decision {
        mode: rule.mode,
        policy_rule_id: rule.id.clone(),
        decision_reason: format!(
            "rule `{}` matched {} {} job at {reading} gCO2/kWh ({band})",
            rule.id, job.urgency, job.job_type
        ),
        carbon_intensity_at_decision: reading,
        guardrail_applied: false,
    };

    Ok(apply_critical_override(job.urgency, band, tentative))
}

/// Force a critical job's deferral onto the ECO lane.
///
/// Critical jobs already headed to FAST or ECO pass through untouched, which
/// also makes this idempotent on its own output.
#[must_use]
pub fn apply_critical_override(urgency: Urgency, band: Band, tentative: Decision) -> Decision {
    if urgency != Urgency::Critical || tentative.mode != Mode::Defer {
        return tentative;
    }
    Decision {
        mode: Mode::Eco,
        policy_rule_id: GUARDRAIL_CRITICAL_OVERRIDE.to_string(),
        decision_reason: format!(
            "critical job may not be deferred (rule `{}` chose DEFER in {band} band); routed to ECO",
            tentative.policy_rule_id
        ),
        carbon_intensity_at_decision: tentative.carbon_intensity_at_decision,
        guardrail_applied: true,
    }
}

/// Whether a deferral deadline has elapsed at `now_ms`.
#[must_use]
pub const fn deadline_elapsed(defer_deadline_ms: u128, now_ms: u128) -> bool {
    now_ms >= defer_deadline_ms
}

/// Max-deferral guardrail: route an expired deferral to ECO.
#[must_use]
pub fn apply_max_deferral(reading: f64, defer_deadline_ms: u128, now_ms: u128) -> Decision {
    Decision {
        mode: Mode::Eco,
        policy_rule_id: GUARDRAIL_MAX_DEFERRAL.to_string(),
        decision_reason: format!(
            "deferral deadline {defer_deadline_ms} elapsed at {now_ms}; released to ECO at {reading} gCO2/kWh"
        ),
        carbon_intensity_at_decision: reading,
        guardrail_applied: true,
    }
}

/// Green-window release of a deferred job to FAST.
#[must_use]
pub fn green_window_release(reading: f64) -> Decision {
    Decision {
        mode: Mode::Fast,
        policy_rule_id: GREEN_WINDOW_RELEASE.to_string(),
        decision_reason: format!("green window at {reading} gCO2/kWh; released to FAST"),
        carbon_intensity_at_decision: reading,
        guardrail_applied: false,
    }
}

/// Release decision for one deferred job, or `None` if it stays deferred.
///
/// A green reading releases regardless of deadline; otherwise only an
/// elapsed deadline releases, via the max-deferral guardrail.
#[must_use]
pub fn release_decision(
    reading: f64,
    policy: &Policy,
    defer_deadline_ms: u128,
    now_ms: u128,
) -> Option<Decision> {
    if policy.band(reading) == Band::Green {
        Some(green_window_release(reading))
    } else if deadline_elapsed(defer_deadline_ms, now_ms) {
        Some(apply_max_deferral(reading, defer_deadline_ms, now_ms))
    } else {
        None
    }
}
