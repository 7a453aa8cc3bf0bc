//! Carbon signal port.

use async_trait::async_trait;

use crate::core::SchedulerError;

/// Source of carbon-intensity readings in gCO2/kWh.
///
/// Every call is a fresh sample; callers do their own sharing within a tick.
#[async_trait]
pub trait CarbonSignal: Send + Sync {
    /// Take one reading.
    async fn read(&self) -> Result<f64, SchedulerError>;
}

/// Read once and reject non-finite values.
pub(crate) async fn sample<C>(signal: &C) -> Result<f64, SchedulerError>
where
    C: CarbonSignal + ?Sized,
{
    let reading = signal.read().await?;
    if reading.is_finite() {
        Ok(reading)
    } else {
        Err(SchedulerError::SignalUnavailable(format!(
            "non-finite reading {reading}"
        )))
    }
}
