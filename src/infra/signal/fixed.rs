//! Constant carbon signal.

use async_trait::async_trait;

use crate::core::{CarbonSignal, SchedulerError};

/// Signal that always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedCarbonSignal {
    reading: f64,
}

impl FixedCarbonSignal {
    /// Create a signal pinned at `reading` gCO2/kWh.
    #[must_use]
    pub const fn new(reading: f64) -> Self {
        Self { reading }
    }
}

#[async_trait]
impl CarbonSignal for FixedCarbonSignal {
    async fn read(&self) -> Result<f64, SchedulerError> {
        Ok(self.reading)
    }
}
