//! Market data source contract.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BarSeries, StockCode, ValidationError};

/// Requested lookback window for a daily bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "2mo")]
    TwoMonths,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
}

impl Lookback {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::TwoMonths => "2mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
        }
    }

    /// Approximate calendar-day span, used by offline fake data.
    pub const fn approx_days(self) -> usize {
        match self {
            Self::OneMonth => 30,
            Self::TwoMonths => 61,
            Self::ThreeMonths => 91,
            Self::SixMonths => 183,
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self::ThreeMonths
    }
}

impl Display for Lookback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "2mo" => Ok(Self::TwoMonths),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            other => Err(ValidationError::InvalidLookback {
                value: other.to_owned(),
            }),
        }
    }
}

/// Request payload for the daily bars endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBarsRequest {
    pub code: StockCode,
    pub lookback: Lookback,
}

impl DailyBarsRequest {
    pub fn new(code: StockCode, lookback: Lookback) -> Self {
        Self { code, lookback }
    }
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured provider error carried through the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the scanner may hold them behind
/// an `Arc<dyn MarketDataSource>`.
pub trait MarketDataSource: Send + Sync {
    /// Fetch daily close/volume bars covering at least the requested
    /// lookback window, ending at "now".
    ///
    /// An instrument with no data (delisted, never listed) yields an empty
    /// series, not an error.
    fn daily_bars<'a>(
        &'a self,
        req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>>;
}
