//! Yahoo Finance chart adapter.
//!
//! Fetches daily bars from the public v8 chart endpoint. TWSE instruments
//! are addressed with a `.TW` suffix on the exchange code. The endpoint
//! needs no authentication for historical chart data.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::source::{DailyBarsRequest, MarketDataSource, SourceError};
use crate::{BarSeries, DailyBar, StockCode, TradingDay};

/// Yahoo chart source supporting both real API calls and a deterministic
/// offline mode (selected by the injected transport's `is_mock`).
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for YahooChartSource {
    fn default() -> Self {
        Self::new(Arc::new(NoopHttpClient))
    }
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            timeout_ms: 10_000,
            use_real_api,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn endpoint(req: &DailyBarsRequest) -> String {
        format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}.TW?range={}&interval=1d",
            urlencoding::encode(req.code.as_str()),
            req.lookback.as_str()
        )
    }

    async fn execute(&self, endpoint: String) -> Result<String, SourceError> {
        let request = HttpRequest::get(endpoint)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited("yahoo rate limit hit (429)"));
        }

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }

    async fn fetch_real(&self, req: &DailyBarsRequest) -> Result<BarSeries, SourceError> {
        let body = self.execute(Self::endpoint(req)).await?;
        parse_chart(&req.code, &body)
    }

    /// Deterministic synthetic series for offline tests: one bar per
    /// calendar day ending at today's exchange-local session date.
    async fn fetch_fake(&self, req: &DailyBarsRequest) -> Result<BarSeries, SourceError> {
        // Still exercises the transport so scripted mocks can fail the call.
        self.execute(Self::endpoint(req)).await?;

        let count = req.lookback.approx_days();
        let seed = code_seed(&req.code);
        let today = TradingDay::today();

        let mut bars = Vec::with_capacity(count);
        for index in 0..count {
            let back = (count - 1 - index) as i64;
            let day = today
                .checked_add_days(-back)
                .ok_or_else(|| SourceError::internal("fake series date out of range"))?;
            let close = 40.0 + ((seed + index as u64) % 600) as f64 / 10.0;
            let volume = 900_000 + (seed + index as u64 * 37) % 700_000;

            if let Ok(bar) = DailyBar::new(day, close, volume) {
                bars.push(bar);
            }
        }

        BarSeries::new(req.code.clone(), bars)
            .map_err(|error| SourceError::internal(error.to_string()))
    }
}

impl MarketDataSource for YahooChartSource {
    fn daily_bars<'a>(
        &'a self,
        req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real(&req).await
            } else {
                self.fetch_fake(&req).await
            }
        })
    }
}

fn parse_chart(code: &StockCode, body: &str) -> Result<BarSeries, SourceError> {
    let chart: ChartResponse = serde_json::from_str(body)
        .map_err(|error| SourceError::internal(format!("failed to parse yahoo chart: {error}")))?;

    if let Some(error) = chart.chart.error {
        return Err(SourceError::invalid_request(format!(
            "yahoo chart error {}: {}",
            error.code, error.description
        )));
    }

    let result = match chart.chart.result.and_then(|mut results| {
        if results.is_empty() {
            None
        } else {
            Some(results.remove(0))
        }
    }) {
        Some(result) => result,
        None => return Ok(BarSeries::empty(code.clone())),
    };

    let timestamps = match result.timestamp {
        Some(timestamps) => timestamps,
        None => return Ok(BarSeries::empty(code.clone())),
    };

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::internal("chart response missing quote block"))?;

    let mut bars: Vec<DailyBar> = Vec::with_capacity(timestamps.len());
    for (index, ts) in timestamps.iter().enumerate() {
        // Suspended sessions come back as null rows; drop them like the
        // provider's own clients do.
        let close = match quote.close.get(index).copied().flatten() {
            Some(close) => close,
            None => continue,
        };
        let volume = quote
            .volume
            .get(index)
            .copied()
            .flatten()
            .filter(|v| *v >= 0)
            .unwrap_or(0) as u64;

        let day = TradingDay::from_unix_timestamp(*ts)
            .map_err(|error| SourceError::internal(error.to_string()))?;

        let bar = match DailyBar::new(day, close, volume) {
            Ok(bar) => bar,
            Err(_) => continue,
        };

        match bars.last() {
            // The live intraday row repeats the last session date; keep the
            // later values.
            Some(prev) if bar.day() == prev.day() => {
                bars.pop();
                bars.push(bar);
            }
            Some(prev) if bar.day() < prev.day() => continue,
            _ => bars.push(bar),
        }
    }

    BarSeries::new(code.clone(), bars).map_err(|error| SourceError::internal(error.to_string()))
}

fn code_seed(code: &StockCode) -> u64 {
    code.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

// Yahoo Finance chart response structures.
#[derive(Debug, Clone, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
