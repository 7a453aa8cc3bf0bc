//! In-memory store implementing every capability trait on one lock.
//!
//! Each trait call takes the lock once, so a single call is atomic with
//! respect to the other loop.

use std::collections::{BTreeSet, HashMap, VecDeque};

use parking_lot::Mutex;

use crate::core::store::{DeferredSet, JobStore, LaneQueue, PendingQueue};
use crate::core::{Job, JobField, JobId, JobStatus, Mode, SchedulerError};

#[derive(Default)]
struct StoreState {
    jobs: HashMap<JobId, Job>,
    pending: VecDeque<JobId>,
    fast: VecDeque<JobId>,
    eco: VecDeque<JobId>,
    /// Ordered by `(deadline, id)`.
    deferred: BTreeSet<(u128, JobId)>,
    deadlines: HashMap<JobId, u128>,
}

impl StoreState {
    fn lane_mut(&mut self, lane: Mode) -> Result<&mut VecDeque<JobId>, SchedulerError> {
        match lane {
            Mode::Fast => Ok(&mut self.fast),
            Mode::Eco => Ok(&mut self.eco),
            Mode::Defer => Err(SchedulerError::StoreFailure(
                "DEFER is not an execution lane".into(),
            )),
        }
    }
}

/// Process-local store for development, tests, and the demo binary.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the next job id off an execution lane, as a lane worker would.
    pub fn pop_lane(&self, lane: Mode) -> Option<JobId> {
        self.state.lock().lane_mut(lane).ok()?.pop_front()
    }

    /// Snapshot of the ids queued on a lane.
    #[must_use]
    pub fn lane_ids(&self, lane: Mode) -> Vec<JobId> {
        let mut state = self.state.lock();
        state
            .lane_mut(lane)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of ids waiting on the pending queue.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Number of deferred jobs.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.state.lock().deferred.len()
    }

    /// Write execution outcome fields, as a lane worker would on completion.
    pub fn record_outcome(
        &self,
        id: &str,
        duration_secs: f64,
        emissions_g: f64,
    ) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        let job = state
            .jobs
            .get_mut(id)
            .ok_or_else(|| SchedulerError::StoreFailure(format!("no job {id}")))?;
        job.duration_secs = Some(duration_secs);
        job.emissions_g = Some(emissions_g);
        job.status = JobStatus::Done;
        Ok(())
    }
}

impl JobStore for InMemoryStore {
    fn insert(&self, job: Job) -> Result<(), SchedulerError> {
        self.state.lock().jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Job>, SchedulerError> {
        Ok(self.state.lock().jobs.get(id).cloned())
    }

    fn update(&self, id: &str, fields: Vec<JobField>) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        let job = state
            .jobs
            .get_mut(id)
            .ok_or_else(|| SchedulerError::StoreFailure(format!("no job {id}")))?;
        for field in fields {
            job.apply(field);
        }
        Ok(())
    }

    fn list(&self, lane: Mode) -> Result<Vec<Job>, SchedulerError> {
        let state = self.state.lock();
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|j| j.mode == Some(lane))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.id.cmp(&b.id)));
        Ok(jobs)
    }
}

impl PendingQueue for InMemoryStore {
    fn enqueue(&self, id: JobId) -> Result<(), SchedulerError> {
        self.state.lock().pending.push_back(id);
        Ok(())
    }

    fn dequeue_all(&self) -> Result<Vec<JobId>, SchedulerError> {
        Ok(self.state.lock().pending.drain(..).collect())
    }
}

impl LaneQueue for InMemoryStore {
    fn push(&self, lane: Mode, id: JobId) -> Result<(), SchedulerError> {
        self.state.lock().lane_mut(lane)?.push_back(id);
        Ok(())
    }
}

impl DeferredSet for InMemoryStore {
    fn add(&self, id: JobId, deadline_ms: u128) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        if let Some(previous) = state.deadlines.insert(id.clone(), deadline_ms) {
            state.deferred.remove(&(previous, id.clone()));
        }
        state.deferred.insert((deadline_ms, id));
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<(JobId, u128)>, SchedulerError> {
        Ok(self
            .state
            .lock()
            .deferred
            .iter()
            .map(|(deadline, id)| (id.clone(), *deadline))
            .collect())
    }

    fn remove(&self, id: &str) -> Result<bool, SchedulerError> {
        let mut state = self.state.lock();
        match state.deadlines.remove(id) {
            Some(deadline) => {
                state.deferred.remove(&(deadline, id.to_string()));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
