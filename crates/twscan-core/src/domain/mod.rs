//! Canonical domain types for the scanner.
//!
//! All types validate their invariants at construction:
//!
//! - [`StockCode`] — four-digit TWSE equity code
//! - [`TradingDay`] — exchange-local calendar date
//! - [`DailyBar`] — close/volume aggregate for one session
//! - [`BarSeries`] — strictly date-ordered bar sequence

mod code;
mod models;
mod trading_day;

pub use code::{StockCode, CODE_LEN};
pub use models::{BarSeries, DailyBar};
pub use trading_day::TradingDay;
