//! Runtime adapters: tokio run loops and the API-facing helpers.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod service;

pub use api::{explain_job, health, submit_job, Health, JobExplanation, JobSubmission};
#[cfg(feature = "tokio-runtime")]
pub use service::{run_intake, run_sweep};
