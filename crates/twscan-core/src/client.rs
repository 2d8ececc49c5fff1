//! Market data client with bounded retry.

use std::sync::Arc;

use thiserror::Error;

use crate::retry::RetryPolicy;
use crate::signal::MIN_HISTORY;
use crate::source::{DailyBarsRequest, Lookback, MarketDataSource, SourceError};
use crate::{BarSeries, StockCode};

/// Terminal per-instrument fetch outcomes.
///
/// `Empty` and `InsufficientHistory` are legitimate zero-result outcomes
/// (delisted or newly listed instruments), not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Series(BarSeries),
    Empty,
    InsufficientHistory { bars: usize },
}

/// Transient provider failure that exhausted the retry budget for one
/// instrument. Never aborts the run; the instrument is skipped.
#[derive(Debug, Clone, Error)]
#[error("fetch failed for {code} after {attempts} attempt(s): {last_error}")]
pub struct FetchFailed {
    pub code: StockCode,
    pub attempts: u32,
    pub last_error: SourceError,
}

/// Retrieves one instrument's series, recovering from transient failures
/// via the configured retry policy.
#[derive(Clone)]
pub struct MarketDataClient {
    source: Arc<dyn MarketDataSource>,
    retry: RetryPolicy,
}

impl MarketDataClient {
    pub fn new(source: Arc<dyn MarketDataSource>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    pub async fn fetch_series(
        &self,
        code: &StockCode,
        lookback: Lookback,
    ) -> Result<FetchOutcome, FetchFailed> {
        let req = DailyBarsRequest::new(code.clone(), lookback);
        let mut attempts = 0_u32;

        loop {
            attempts += 1;
            match self.source.daily_bars(req.clone()).await {
                Ok(series) => return Ok(classify(series)),
                Err(error) => {
                    if !error.retryable() || attempts >= self.retry.max_attempts {
                        return Err(FetchFailed {
                            code: code.clone(),
                            attempts,
                            last_error: error,
                        });
                    }

                    tokio::time::sleep(self.retry.delay_for(attempts - 1)).await;
                }
            }
        }
    }
}

fn classify(series: BarSeries) -> FetchOutcome {
    if series.is_empty() {
        FetchOutcome::Empty
    } else if series.len() < MIN_HISTORY {
        FetchOutcome::InsufficientHistory { bars: series.len() }
    } else {
        FetchOutcome::Series(series)
    }
}
