//! Session freshness guards.
//!
//! A series whose most recent bar is dated before today's session reflects
//! a prior close; emitting signals from it would report yesterday's moves
//! as today's. The stale-streak heuristic is isolated here so alternate
//! strategies (a market-calendar source, say) can replace it without
//! touching the signal engine.

use crate::{BarSeries, TradingDay};

/// Whether the series' most recent bar belongs to the target session.
pub fn is_current_session(series: &BarSeries, target: TradingDay) -> bool {
    series.latest_day() == Some(target)
}

/// Counts consecutive stale results across instruments.
///
/// When the streak exceeds the threshold without an intervening fresh
/// result, the whole market is presumed closed (weekend, holiday,
/// pre-close) and the scan can stop early. This is an optimization, not a
/// correctness requirement.
#[derive(Debug, Clone)]
pub struct StaleStreak {
    consecutive: u32,
    threshold: u32,
}

impl StaleStreak {
    pub const DEFAULT_THRESHOLD: u32 = 10;

    pub fn new(threshold: u32) -> Self {
        Self {
            consecutive: 0,
            threshold,
        }
    }

    /// Records one stale result; returns true once the market looks closed.
    pub fn record_stale(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive > self.threshold
    }

    /// Any fresh result resets the streak.
    pub fn record_fresh(&mut self) {
        self.consecutive = 0;
    }

    pub fn count(&self) -> u32 {
        self.consecutive
    }
}

impl Default for StaleStreak {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
