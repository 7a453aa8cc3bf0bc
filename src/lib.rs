//! # Carbon Scheduler
//!
//! A carbon-aware scheduling decision engine.
//!
//! Pending jobs are evaluated against an ordered, externally configured
//! policy and a live carbon-intensity reading, then routed to the FAST or
//! ECO execution lane or parked in a time-bounded deferral set. A second
//! loop re-evaluates deferred jobs and releases them when the grid turns
//! green or when their deferral deadline passes.
//!
//! ## Core Pieces
//!
//! - **Policy**: thresholds splitting readings into green / amber / red
//!   bands, an ordered first-match rule list over `(urgency, band)`, and the
//!   maximum deferral time.
//! - **Decision engine**: [`core::decide`] is pure. It never performs I/O and
//!   signals [`core::SchedulerError::PolicyExhausted`] instead of guessing a
//!   lane when no rule matches.
//! - **Guardrails**: critical jobs are never deferred
//!   (`GUARDRAIL_CRITICAL_OVERRIDE`); deferred jobs never outlive their
//!   deadline (`GUARDRAIL_MAX_DEFERRAL`).
//! - **Intake loop** and **deferral sweep**: two independent polling loops
//!   that only talk through the shared store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use carbon_scheduler::builders::{build_scheduler, build_signal};
//! use carbon_scheduler::config::SchedulerConfig;
//! use carbon_scheduler::infra::InMemoryStore;
//!
//! let cfg = SchedulerConfig::from_env()?;
//! let policy = cfg.load_policy()?;
//! let store = Arc::new(InMemoryStore::new());
//! let signal = Arc::new(build_signal(&cfg)?);
//! let scheduler = build_scheduler(&cfg, policy, store, signal, None)?;
//!
//! let (tx, rx) = tokio::sync::watch::channel(false);
//! scheduler.run(rx).await;
//! ```
//!
//! For complete scenarios, see `tests/scheduling_scenarios_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling model, decision engine, and polling loops.
pub mod core;
/// Configuration models for the scheduler process and policy loading.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters for the store and carbon signals.
pub mod infra;
/// Runtime drivers and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
