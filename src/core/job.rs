//! Job records and the partial-field updates the loops write onto them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque job identifier assigned at intake.
pub type JobId = String;

/// Urgency class of a job; the only job attribute the policy branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// SLO-bound work that may never be deferred.
    Critical,
    /// Work that tolerates deferral.
    Flexible,
    /// Default class.
    #[default]
    Normal,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Flexible => write!(f, "flexible"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "flexible" => Ok(Self::Flexible),
            "normal" => Ok(Self::Normal),
            other => Err(format!("unknown urgency `{other}`")),
        }
    }
}

/// Lifecycle of a job.
///
/// `Queued -> Scheduled -> Running -> Done`, with `Deferred` as the
/// alternate post-`Queued` state that always ends in `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting on the pending queue.
    Queued,
    /// Held in the deferred set until release.
    Deferred,
    /// Pushed onto an execution lane.
    Scheduled,
    /// Picked up by a lane worker.
    Running,
    /// Finished by a lane worker.
    Done,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "QUEUED",
            Self::Deferred => "DEFERRED",
            Self::Scheduled => "SCHEDULED",
            Self::Running => "RUNNING",
            Self::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Lane chosen by the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Run immediately at full speed.
    Fast,
    /// Run on the conservative, always-available lane.
    Eco,
    /// Hold until a green window or the deferral deadline. Always transient.
    Defer,
}

impl Mode {
    /// Whether this mode names an execution lane (as opposed to deferral).
    #[must_use]
    pub const fn is_lane(self) -> bool {
        matches!(self, Self::Fast | Self::Eco)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "FAST"),
            Self::Eco => write!(f, "ECO"),
            Self::Defer => write!(f, "DEFER"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAST" => Ok(Self::Fast),
            "ECO" => Ok(Self::Eco),
            "DEFER" => Ok(Self::Defer),
            other => Err(format!("unknown mode `{other}`")),
        }
    }
}

/// A unit of work as held by the job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier, immutable after intake.
    pub id: JobId,
    /// Free-form classification, surfaced for observability only.
    pub job_type: String,
    /// Urgency class.
    pub urgency: Urgency,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Chosen lane, `None` until decided.
    pub mode: Option<Mode>,
    /// Rule or guardrail that produced the most recent decision.
    pub policy_rule_id: Option<String>,
    /// Human-readable reason for the most recent decision.
    pub decision_reason: Option<String>,
    /// Carbon reading used by the most recent decision.
    pub carbon_intensity_at_decision: Option<f64>,
    /// Release deadline (ms since epoch), present only while deferred.
    pub defer_deadline_ms: Option<u128>,
    /// Operator-facing flag set when the engine could not route the job.
    pub attention: Option<String>,
    /// Execution duration, written by lane workers.
    pub duration_secs: Option<f64>,
    /// Estimated emissions, written by lane workers.
    pub emissions_g: Option<f64>,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u128,
}

impl Job {
    /// Build a freshly queued job.
    pub fn new(
        id: impl Into<JobId>,
        job_type: impl Into<String>,
        urgency: Urgency,
        created_at_ms: u128,
    ) -> Self {
        Self {
            id: id.into(),
            job_type: job_type.into(),
            urgency,
            status: JobStatus::Queued,
            mode: None,
            policy_rule_id: None,
            decision_reason: None,
            carbon_intensity_at_decision: None,
            defer_deadline_ms: None,
            attention: None,
            duration_secs: None,
            emissions_g: None,
            created_at_ms,
        }
    }

    /// Apply a single field update in place.
    pub fn apply(&mut self, field: JobField) {
        match field {
            JobField::Status(status) => self.status = status,
            JobField::Mode(mode) => self.mode = mode,
            JobField::PolicyRuleId(id) => self.policy_rule_id = id,
            JobField::DecisionReason(reason) => self.decision_reason = reason,
            JobField::CarbonIntensity(reading) => self.carbon_intensity_at_decision = reading,
            JobField::DeferDeadline(deadline) => self.defer_deadline_ms = deadline,
            JobField::Attention(note) => self.attention = note,
        }
    }

    /// Snapshot of every scheduler-owned field, used to roll back a failed move.
    #[must_use]
    pub fn scheduling_fields(&self) -> Vec<JobField> {
        vec![
            JobField::Status(self.status),
            JobField::Mode(self.mode),
            JobField::PolicyRuleId(self.policy_rule_id.clone()),
            JobField::DecisionReason(self.decision_reason.clone()),
            JobField::CarbonIntensity(self.carbon_intensity_at_decision),
            JobField::DeferDeadline(self.defer_deadline_ms),
            JobField::Attention(self.attention.clone()),
        ]
    }
}

/// One scheduler-owned field of a [`Job`].
///
/// Updates are expressed as lists of fields so stores can apply them as a
/// partial write; execution outcome fields are never part of this set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobField {
    /// Lifecycle state.
    Status(JobStatus),
    /// Chosen lane.
    Mode(Option<Mode>),
    /// Producing rule or guardrail id.
    PolicyRuleId(Option<String>),
    /// Human-readable reason.
    DecisionReason(Option<String>),
    /// Reading used by the decision.
    CarbonIntensity(Option<f64>),
    /// Deferral deadline.
    DeferDeadline(Option<u128>),
    /// Operator attention flag.
    Attention(Option<String>),
}
