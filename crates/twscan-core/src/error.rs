use thiserror::Error;

/// Validation and contract errors exposed by `twscan-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("stock code cannot be empty")]
    EmptyCode,
    #[error("stock code length {len} must be exactly {expected}")]
    CodeInvalidLength { len: usize, expected: usize },
    #[error("stock code contains non-digit character '{ch}' at index {index}")]
    CodeInvalidChar { ch: char, index: usize },

    #[error("invalid trading day '{value}', expected YYYY-MM-DD")]
    InvalidTradingDay { value: String },
    #[error("unix timestamp {value} is outside the representable date range")]
    TimestampOutOfRange { value: i64 },

    #[error("invalid lookback '{value}', expected one of 1mo, 2mo, 3mo, 6mo")]
    InvalidLookback { value: String },

    #[error("close price must be finite and positive, got {value}")]
    InvalidClose { value: f64 },

    #[error("bar at index {index} is not strictly after the preceding bar")]
    OutOfOrderBar { index: usize },
}
