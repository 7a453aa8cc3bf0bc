//! Capability traits the loops need from the shared store.
//!
//! Each trait is a narrow slice of what a keyed store plus a few queues
//! provide. Any backend whose moves are atomic per call satisfies the
//! contract; the in-memory backend implements all of them on one type.

use crate::core::job::{Job, JobField, JobId, Mode};
use crate::core::SchedulerError;

/// Keyed job records with partial-field update.
pub trait JobStore {
    /// Insert or replace a job record.
    fn insert(&self, job: Job) -> Result<(), SchedulerError>;
    /// Fetch a job record.
    fn get(&self, id: &str) -> Result<Option<Job>, SchedulerError>;
    /// Apply field updates to an existing record.
    fn update(&self, id: &str, fields: Vec<JobField>) -> Result<(), SchedulerError>;
    /// Jobs whose chosen mode is `lane`.
    fn list(&self, lane: Mode) -> Result<Vec<Job>, SchedulerError>;
}

/// FIFO arrival buffer feeding the intake loop.
pub trait PendingQueue {
    /// Append a job id.
    fn enqueue(&self, id: JobId) -> Result<(), SchedulerError>;
    /// Take every queued id in arrival order.
    fn dequeue_all(&self) -> Result<Vec<JobId>, SchedulerError>;
}

/// Execution lane queues. The scheduler only ever pushes.
pub trait LaneQueue {
    /// Push a job id onto the FAST or ECO lane.
    fn push(&self, lane: Mode, id: JobId) -> Result<(), SchedulerError>;
}

/// Deferred holding area ordered by deadline.
pub trait DeferredSet {
    /// Add a job with its release deadline (ms since epoch).
    fn add(&self, id: JobId, deadline_ms: u128) -> Result<(), SchedulerError>;
    /// Every deferred `(id, deadline)` pair, earliest deadline first.
    fn list_all(&self) -> Result<Vec<(JobId, u128)>, SchedulerError>;
    /// Remove a job; returns whether it was present.
    fn remove(&self, id: &str) -> Result<bool, SchedulerError>;
}
