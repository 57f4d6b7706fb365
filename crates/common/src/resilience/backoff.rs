//! Exponential backoff schedule.

use std::time::Duration;

use tracing::trace;

/// Largest exponent applied to the base delay. Keeps the multiplier in `u32`.
const MAX_SHIFT: u32 = 16;

/// Delay schedule `base × 2^(attempt − 1)`.
///
/// Attempt numbers are 1-based: the delay after the first failed attempt is
/// `base`, after the second `2 × base`, and so on. A zero base disables
/// sleeping entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
}

impl ExponentialBackoff {
    /// Create a schedule starting at `base`.
    pub const fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Base delay of the schedule.
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Delay to wait after failed attempt number `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_SHIFT);
        let multiplier = 1u32 << shift;
        self.base.saturating_mul(multiplier)
    }

    /// Sleep for the delay belonging to `attempt`.
    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay_for(attempt);
        if !delay.is_zero() {
            trace!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
            tokio::time::sleep(delay).await;
        }
    }
}
