//! Wall-clock helpers shared by the loops and the API surface.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// A clock set before the epoch reads as `0`.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Deadline `seconds` after `now_ms`.
#[must_use]
pub fn deadline_after(now_ms: u128, seconds: u64) -> u128 {
    now_ms.saturating_add(u128::from(seconds) * 1000)
}
