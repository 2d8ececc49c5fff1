//! Retry policy for per-instrument fetches.
//!
//! Retries are an explicit bounded loop in the fetch client, not
//! exception-driven control flow; this module only computes attempts and
//! delays so failure paths stay enumerable in tests.

use std::time::Duration;

/// Bounded exponential backoff applied to transient provider failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first (so 3 means up to 2 retries).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplicative factor per subsequent retry.
    pub multiplier: f64,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Apply random jitter (+/- 50%) to each delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(8),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let scale = self.multiplier.powi(retry as i32);
        let seconds = self.initial_delay.as_secs_f64() * scale;
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let mut delay = Duration::from_secs_f64(capped);

        if self.jitter {
            let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
            let offset = fastrand::u64(0..=(jitter_ms * 2)) as i64 - jitter_ms as i64;
            let total_ms = delay.as_millis() as i64 + offset;
            delay = Duration::from_millis(total_ms.max(0) as u64);
        }

        delay
    }
}
