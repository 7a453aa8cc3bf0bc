//! API-facing request/response models.
//!
//! The HTTP layer lives outside this crate; these helpers are what it calls
//! to submit work and to read back a job's decision.

use serde::{Deserialize, Serialize};

use crate::core::{
    Job, JobId, JobStatus, JobStore, Mode, PendingQueue, SchedulerError, Urgency,
};

const DEFAULT_JOB_TYPE: &str = "generic";

/// Job submission payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSubmission {
    /// Free-form job classification.
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    /// Urgency name; `normal` when omitted.
    #[serde(default)]
    pub urgency: Option<String>,
}

/// Read-only view of a job's most recent decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExplanation {
    /// Job identifier.
    pub job_id: JobId,
    /// Job classification.
    pub job_type: String,
    /// Urgency class.
    pub urgency: Urgency,
    /// Current status.
    pub status: JobStatus,
    /// Chosen mode, if decided.
    pub mode: Option<Mode>,
    /// Rule or guardrail id.
    pub policy_rule_id: Option<String>,
    /// Decision reason.
    pub decision_reason: Option<String>,
    /// Reading used by the decision.
    pub carbon_intensity_at_decision: Option<f64>,
    /// Deferral deadline, if deferred.
    pub defer_deadline_ms: Option<u128>,
    /// Operator attention flag.
    pub attention: Option<String>,
}

impl From<Job> for JobExplanation {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            job_type: job.job_type,
            urgency: job.urgency,
            status: job.status,
            mode: job.mode,
            policy_rule_id: job.policy_rule_id,
            decision_reason: job.decision_reason,
            carbon_intensity_at_decision: job.carbon_intensity_at_decision,
            defer_deadline_ms: job.defer_deadline_ms,
            attention: job.attention,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Service name.
    pub service: String,
}

/// Create a queued job and put it on the pending queue.
pub fn submit_job<S>(store: &S, req: JobSubmission, now_ms: u128) -> Result<JobId, SchedulerError>
where
    S: JobStore + PendingQueue,
{
    let urgency = match req.urgency.as_deref().map(str::trim) {
        None | Some("") => Urgency::default(),
        Some(raw) => raw.parse().map_err(SchedulerError::InvalidJob)?,
    };
    let job_type = req
        .job_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string());

    let id = uuid::Uuid::new_v4().to_string();
    store.insert(Job::new(id.clone(), job_type, urgency, now_ms))?;
    store.enqueue(id.clone())?;
    tracing::info!(job_id = %id, %urgency, "job submitted");
    Ok(id)
}

/// Decision view of one job.
pub fn explain_job<S>(store: &S, id: &str) -> Result<JobExplanation, SchedulerError>
where
    S: JobStore,
{
    store
        .get(id)?
        .map(JobExplanation::from)
        .ok_or_else(|| SchedulerError::InvalidJob(format!("unknown job {id}")))
}

/// Return a health payload.
#[must_use]
pub fn health() -> Health {
    Health {
        ok: true,
        service: "scheduler".into(),
    }
}
