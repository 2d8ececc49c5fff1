use serde::{Deserialize, Serialize};

use crate::{StockCode, TradingDay, ValidationError};

/// One trading day's aggregate for a single instrument.
///
/// Volume is in raw shares; reporting in lots happens at the signal layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    day: TradingDay,
    close: f64,
    volume: u64,
}

impl DailyBar {
    pub fn new(day: TradingDay, close: f64, volume: u64) -> Result<Self, ValidationError> {
        if !close.is_finite() || close <= 0.0 {
            return Err(ValidationError::InvalidClose { value: close });
        }

        Ok(Self { day, close, volume })
    }

    pub fn day(&self) -> TradingDay {
        self.day
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }
}

/// Ordered-by-date daily bar series for one instrument.
///
/// Dates are strictly increasing; gaps (non-trading days) are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    code: StockCode,
    bars: Vec<DailyBar>,
}

impl BarSeries {
    pub fn new(code: StockCode, bars: Vec<DailyBar>) -> Result<Self, ValidationError> {
        for (index, window) in bars.windows(2).enumerate() {
            if window[1].day() <= window[0].day() {
                return Err(ValidationError::OutOfOrderBar { index: index + 1 });
            }
        }

        Ok(Self { code, bars })
    }

    pub fn empty(code: StockCode) -> Self {
        Self {
            code,
            bars: Vec::new(),
        }
    }

    pub fn code(&self) -> &StockCode {
        &self.code
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Session date of the most recent bar, when any exist.
    pub fn latest_day(&self) -> Option<TradingDay> {
        self.bars.last().map(DailyBar::day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(input: &str) -> TradingDay {
        TradingDay::parse(input).expect("test date")
    }

    #[test]
    fn rejects_non_positive_close() {
        let err = DailyBar::new(day("2024-01-02"), 0.0, 100).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidClose { .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let code = StockCode::parse("2330").expect("code");
        let bars = vec![
            DailyBar::new(day("2024-01-02"), 100.0, 10).expect("bar"),
            DailyBar::new(day("2024-01-02"), 101.0, 10).expect("bar"),
        ];

        let err = BarSeries::new(code, bars).expect_err("must fail");
        assert!(matches!(err, ValidationError::OutOfOrderBar { index: 1 }));
    }

    #[test]
    fn permits_calendar_gaps() {
        let code = StockCode::parse("2330").expect("code");
        let bars = vec![
            DailyBar::new(day("2024-01-05"), 100.0, 10).expect("bar"),
            DailyBar::new(day("2024-01-08"), 101.0, 10).expect("bar"),
        ];

        let series = BarSeries::new(code, bars).expect("gap across a weekend is fine");
        assert_eq!(series.latest_day(), Some(day("2024-01-08")));
    }
}
