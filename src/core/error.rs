//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::job::Urgency;
use crate::core::policy::Band;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No policy rule matched the job's urgency and the current band.
    #[error("policy exhausted: no rule matches urgency `{urgency}` in band `{band}`")]
    PolicyExhausted {
        /// Urgency of the unmatched job.
        urgency: Urgency,
        /// Band derived from the carbon reading.
        band: Band,
    },
    /// The carbon signal could not produce a usable reading.
    #[error("carbon signal unavailable: {0}")]
    SignalUnavailable(String),
    /// A store, queue, or deferred-set operation failed for one item.
    #[error("store failure: {0}")]
    StoreFailure(String),
    /// The job record is malformed or missing.
    #[error("invalid job: {0}")]
    InvalidJob(String),
    /// Configuration or policy failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
