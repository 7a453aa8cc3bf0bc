//! Configuration models for the scheduler process and its policy.

pub mod scheduler;

pub use scheduler::SchedulerConfig;
