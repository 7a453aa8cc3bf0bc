//! Carbon signal adapters.

pub mod fixed;
pub mod simulated;

pub use fixed::FixedCarbonSignal;
pub use simulated::SimulatedCarbonSignal;
