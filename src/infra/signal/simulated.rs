//! Simulated carbon signal.
//!
//! Stands in for a grid-intensity API (Electricity Maps, WattTime). Readings
//! are drawn uniformly from a configured range unless pinned.

use async_trait::async_trait;
use rand::Rng;

use crate::core::{CarbonSignal, SchedulerError};

/// Uniform random readings in `[min, max]`, or a pinned value.
#[derive(Debug, Clone)]
pub struct SimulatedCarbonSignal {
    min: u32,
    max: u32,
    pinned: Option<u32>,
}

impl SimulatedCarbonSignal {
    /// Random readings in `[min, max]` gCO2/kWh.
    pub fn new(min: u32, max: u32) -> Result<Self, SchedulerError> {
        if min > max {
            return Err(SchedulerError::InvalidConfig(format!(
                "carbon range is empty: {min} > {max}"
            )));
        }
        Ok(Self {
            min,
            max,
            pinned: None,
        })
    }

    /// Pin every reading to `value`. Zero leaves the signal random.
    #[must_use]
    pub const fn pinned(mut self, value: Option<u32>) -> Self {
        self.pinned = match value {
            Some(0) | None => None,
            Some(v) => Some(v),
        };
        self
    }
}

#[async_trait]
impl CarbonSignal for SimulatedCarbonSignal {
    async fn read(&self) -> Result<f64, SchedulerError> {
        let value = match self.pinned {
            Some(v) => v,
            None => rand::rng().random_range(self.min..=self.max),
        };
        tracing::trace!(carbon = value, pinned = self.pinned.is_some(), "carbon sample");
        Ok(f64::from(value))
    }
}
