//! Inter-request pacing.
//!
//! The provider throttles aggressive callers, so consecutive instrument
//! fetches are spaced by a minimum delay. The delay is a tunable policy,
//! not a correctness requirement.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Enforces a minimum delay between consecutive requests.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        let period = min_interval.max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .expect("pacing period is always positive")
            .allow_burst(NonZeroU32::new(1).expect("burst of one is non-zero"));

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            clock: DefaultClock::default(),
        }
    }

    /// Tries to take rate budget; on failure returns the remaining wait.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Waits until budget is available.
    pub async fn pace(&self) {
        while let Err(wait) = self.try_acquire() {
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }
}
