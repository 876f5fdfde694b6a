// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capped exponential backoff for polling loops.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::BackoffConfig;

/// Largest exponent applied to the multiplier
const MAX_EXPONENT: u32 = 16;

/// Delay schedule for consecutive unsuccessful polls.
///
/// ```
/// use std::time::Duration;
/// use the_abacus::worker::BackoffPolicy;
///
/// let policy = BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(1), 2.0);
/// assert_eq!(policy.delay(0), Duration::from_millis(100));
/// assert_eq!(policy.delay(2), Duration::from_millis(400));
/// assert_eq!(policy.delay(10), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
    multiplier: f64,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial,
            max,
            multiplier,
        }
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.get_initial(), config.get_max(), config.get_multiplier())
    }

    /// Delay before retry number `attempt` (zero based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(MAX_EXPONENT) as i32);
        let scaled_ms = (self.initial.as_millis() as f64 * factor).round();
        // NaN and infinity both fail the comparison
        if scaled_ms < self.max.as_millis() as f64 {
            Duration::from_millis(scaled_ms.max(0.0) as u64)
        } else {
            self.max
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}

/// Sleeps for `delay` unless `cancel` fires first. Returns `false` when cancelled.
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_then_caps() {
        let policy = BackoffPolicy::new(Duration::from_millis(10), Duration::from_millis(100), 3.0);
        assert_eq!(policy.delay(0), Duration::from_millis(10));
        assert_eq!(policy.delay(1), Duration::from_millis(30));
        assert_eq!(policy.delay(2), Duration::from_millis(90));
        assert_eq!(policy.delay(3), Duration::from_millis(100));
        assert_eq!(policy.delay(u32::MAX), Duration::from_millis(100));
    }

    #[test]
    fn unit_multiplier_is_a_fixed_interval() {
        let policy = BackoffPolicy::new(Duration::from_millis(20), Duration::from_secs(1), 1.0);
        assert_eq!(policy.delay(0), policy.delay(7));
    }

    #[tokio::test]
    async fn cancellation_interrupts_sleep() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!sleep_or_cancel(Duration::from_secs(60), &cancel).await);
    }

    #[tokio::test]
    async fn sleep_completes_without_cancellation() {
        let cancel = CancellationToken::new();
        assert!(sleep_or_cancel(Duration::from_millis(1), &cancel).await);
    }
}
