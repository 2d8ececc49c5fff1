//! Breakout signal evaluation.
//!
//! Pure and deterministic: given a series, computes trailing simple moving
//! averages at the last two positions and applies the two-condition
//! breakout rule. No I/O happens here.

use serde::Serialize;

use crate::{BarSeries, DailyBar, StockCode, TradingDay};

/// Minimum bar count required for evaluation: the longest MA window.
pub const MIN_HISTORY: usize = 20;

const MA_SHORT: usize = 5;
const MA_MID: usize = 10;
const MA_LONG: usize = 20;

/// Which breakout condition(s) fired. Both can be true for the same
/// instrument and day; reporting order is always Ma5 before Ma10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    CrossedMa5,
    CrossedMa10,
}

impl Trigger {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CrossedMa5 => "crossed 5-average",
            Self::CrossedMa10 => "crossed 10-average",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tunable signal policy values.
///
/// The volume floor is in raw shares; one reporting lot is `lot_size`
/// shares. Defaults follow the reference scan (1,000 lots of 1,000).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConfig {
    pub volume_floor: u64,
    pub lot_size: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            volume_floor: 1_000_000,
            lot_size: 1_000,
        }
    }
}

/// One qualifying instrument on the scan's session date.
///
/// Prices and averages are rounded to two decimals at construction; bias
/// is the percentage deviation of the close from the 20-bar average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutMatch {
    pub code: StockCode,
    pub name: String,
    pub day: TradingDay,
    pub triggers: Vec<Trigger>,
    pub close: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub bias_pct: f64,
    pub volume_lots: u64,
}

/// Evaluates the breakout rule for one series.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Evaluate the two most recent bars. Returns a match when either
    /// breakout condition holds, tagging every condition that fired.
    pub fn evaluate(&self, series: &BarSeries, display_name: &str) -> Option<BreakoutMatch> {
        let bars = series.bars();
        if bars.len() < MIN_HISTORY {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(DailyBar::close).collect();
        let today_pos = closes.len() - 1;
        let yday_pos = today_pos - 1;
        let today = &bars[today_pos];
        let yesterday = &bars[yday_pos];

        let ma5_today = sma(&closes, MA_SHORT, today_pos)?;
        let ma10_today = sma(&closes, MA_MID, today_pos)?;
        let ma20_today = sma(&closes, MA_LONG, today_pos)?;
        let ma5_yday = sma(&closes, MA_SHORT, yday_pos)?;
        let ma10_yday = sma(&closes, MA_MID, yday_pos)?;

        let volume_ok = today.volume() > self.config.volume_floor;

        // Strict inequalities on both sides: a close sitting exactly on an
        // average is neither above nor below it.
        let crossed_ma5 = today.close() > ma5_today
            && yesterday.close() < ma5_yday
            && today.close() > ma10_today
            && today.close() > ma20_today
            && volume_ok;

        let crossed_ma10 = today.close() > ma10_today
            && yesterday.close() < ma10_yday
            && today.close() > ma5_today
            && today.close() > ma20_today
            && volume_ok;

        if !crossed_ma5 && !crossed_ma10 {
            return None;
        }

        let mut triggers = Vec::with_capacity(2);
        if crossed_ma5 {
            triggers.push(Trigger::CrossedMa5);
        }
        if crossed_ma10 {
            triggers.push(Trigger::CrossedMa10);
        }

        let bias_pct = (today.close() - ma20_today) / ma20_today * 100.0;

        Some(BreakoutMatch {
            code: series.code().clone(),
            name: display_name.to_owned(),
            day: today.day(),
            triggers,
            close: round2(today.close()),
            ma5: round2(ma5_today),
            ma10: round2(ma10_today),
            ma20: round2(ma20_today),
            bias_pct: round2(bias_pct),
            volume_lots: today.volume() / self.config.lot_size.max(1),
        })
    }
}

/// Trailing simple moving average ending at `pos`; absent when fewer than
/// `window` values precede it.
fn sma(closes: &[f64], window: usize, pos: usize) -> Option<f64> {
    if pos + 1 < window {
        return None;
    }
    let slice = &closes[pos + 1 - window..=pos];
    Some(slice.iter().sum::<f64>() / window as f64)
}

/// Round to two decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
