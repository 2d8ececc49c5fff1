//! Core contracts for twscan.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The reference catalog and universe resolution
//! - Market data source trait, adapters, retry and pacing
//! - The breakout signal engine and result aggregation
//! - The sequential scan orchestrator

pub mod adapters;
pub mod catalog;
pub mod client;
pub mod domain;
pub mod error;
pub mod freshness;
pub mod http_client;
pub mod pacing;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod signal;
pub mod source;

pub use adapters::YahooChartSource;
pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use client::{FetchFailed, FetchOutcome, MarketDataClient};
pub use domain::{BarSeries, DailyBar, StockCode, TradingDay, CODE_LEN};
pub use error::ValidationError;
pub use freshness::{is_current_session, StaleStreak};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use pacing::RequestPacer;
pub use report::{ReportError, ScanCounters, ScanReport, COLUMNS, TRIGGER_JOIN};
pub use retry::RetryPolicy;
pub use scanner::{MarketScanner, ScanConfig};
pub use signal::{BreakoutMatch, SignalConfig, SignalEngine, Trigger, MIN_HISTORY};
pub use source::{
    DailyBarsRequest, Lookback, MarketDataSource, SourceError, SourceErrorKind,
};
