//! Infrastructure adapters for the job store, queues, and carbon signals.

pub mod signal;
pub mod store;

pub use signal::{FixedCarbonSignal, SimulatedCarbonSignal};
pub use store::InMemoryStore;
