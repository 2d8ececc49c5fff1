//! Sequential market scan orchestration.
//!
//! Walks the catalog universe one instrument at a time: pace, fetch,
//! freshness-gate, evaluate, collect. Per-instrument failures are isolated;
//! only an unusable catalog aborts a run before it starts.

use std::time::Duration;

use crate::catalog::Catalog;
use crate::client::{FetchOutcome, MarketDataClient};
use crate::freshness::{is_current_session, StaleStreak};
use crate::pacing::RequestPacer;
use crate::report::{ScanCounters, ScanReport};
use crate::retry::RetryPolicy;
use crate::signal::{SignalConfig, SignalEngine};
use crate::source::Lookback;
use crate::TradingDay;

/// Run-level policy knobs with the reference defaults.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub lookback: Lookback,
    /// Minimum delay between consecutive provider requests.
    pub pacing: Duration,
    /// Consecutive stale results tolerated before presuming the market
    /// closed.
    pub stale_threshold: u32,
    pub signal: SignalConfig,
    pub retry: RetryPolicy,
    /// Emit a progress line every this many instruments (0 disables).
    pub progress_every: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback: Lookback::default(),
            pacing: Duration::from_millis(1_500),
            stale_threshold: StaleStreak::DEFAULT_THRESHOLD,
            signal: SignalConfig::default(),
            retry: RetryPolicy::default(),
            progress_every: 100,
        }
    }
}

/// Drives one full scan over a catalog universe.
pub struct MarketScanner {
    client: MarketDataClient,
    config: ScanConfig,
}

impl MarketScanner {
    pub fn new(client: MarketDataClient, config: ScanConfig) -> Self {
        Self { client, config }
    }

    /// Scan against today's exchange session date.
    pub async fn run(&self, catalog: &Catalog) -> ScanReport {
        self.run_for_day(catalog, TradingDay::today()).await
    }

    /// Scan against an explicit session date. Split out so tests can pin
    /// the date instead of depending on the wall clock.
    pub async fn run_for_day(&self, catalog: &Catalog, session: TradingDay) -> ScanReport {
        let universe = catalog.universe();
        let engine = SignalEngine::new(self.config.signal);
        let pacer = RequestPacer::new(self.config.pacing);
        let mut streak = StaleStreak::new(self.config.stale_threshold);

        let mut counters = ScanCounters {
            universe: universe.len(),
            ..ScanCounters::default()
        };
        let mut matches = Vec::new();
        let mut market_closed = false;

        for (i, code) in universe.iter().enumerate() {
            if i > 0 {
                pacer.pace().await;
            }

            if self.config.progress_every > 0 && i > 0 && i % self.config.progress_every == 0 {
                eprintln!(
                    "progress: {i}/{} scanned, {} matched",
                    universe.len(),
                    counters.matched
                );
            }

            counters.scanned += 1;

            let outcome = match self.client.fetch_series(code, self.config.lookback).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    eprintln!("skip {code}: {error}");
                    counters.skipped += 1;
                    continue;
                }
            };

            let series = match outcome {
                FetchOutcome::Series(series) => series,
                FetchOutcome::Empty => {
                    counters.skipped += 1;
                    continue;
                }
                FetchOutcome::InsufficientHistory { .. } => {
                    counters.skipped += 1;
                    continue;
                }
            };

            if !is_current_session(&series, session) {
                counters.stale += 1;
                if streak.record_stale() {
                    let stalled = series
                        .latest_day()
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "unknown".to_owned());
                    eprintln!(
                        "market appears closed: no {session} bars after {} consecutive \
                         instruments (latest seen {stalled}); stopping early",
                        streak.count()
                    );
                    market_closed = true;
                    break;
                }
                continue;
            }
            streak.record_fresh();

            if let Some(m) = engine.evaluate(&series, catalog.display_name(code)) {
                eprintln!(
                    "match {code} {}: {} close {:.2} bias {:.2}%",
                    m.name,
                    m.triggers
                        .iter()
                        .map(|t| t.label())
                        .collect::<Vec<_>>()
                        .join(" & "),
                    m.close,
                    m.bias_pct
                );
                counters.matched += 1;
                matches.push(m);
            }
        }

        ScanReport::from_matches(matches, counters, market_closed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::source::{DailyBarsRequest, MarketDataSource, SourceError};
    use crate::{BarSeries, DailyBar, StockCode};

    /// Source returning a canned per-code response.
    struct MappedSource {
        responses: BTreeMap<String, Result<BarSeries, SourceError>>,
    }

    impl MarketDataSource for MappedSource {
        fn daily_bars<'a>(
            &'a self,
            req: DailyBarsRequest,
        ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
            let response = self
                .responses
                .get(req.code.as_str())
                .cloned()
                .unwrap_or_else(|| Ok(BarSeries::empty(req.code.clone())));
            Box::pin(async move { response })
        }
    }

    fn session() -> TradingDay {
        TradingDay::parse("2024-03-07").expect("date")
    }

    fn catalog_of(codes: &[&str]) -> Catalog {
        Catalog::from_entries(codes.iter().map(|code| {
            (
                (*code).to_owned(),
                CatalogEntry {
                    security_type: Catalog::EQUITY_TYPE.to_owned(),
                    name: format!("股{code}"),
                },
            )
        }))
    }

    /// Breakout series ending on `end`: flat, one dip, then a surge.
    fn breakout_series(code: &str, end: TradingDay) -> BarSeries {
        let mut closes = vec![100.0; 18];
        closes.push(99.0);
        closes.push(105.0);
        series_from(code, end, &closes)
    }

    fn quiet_series(code: &str, end: TradingDay) -> BarSeries {
        series_from(code, end, &vec![100.0; 20])
    }

    fn series_from(code: &str, end: TradingDay, closes: &[f64]) -> BarSeries {
        let code = StockCode::parse(code).expect("code");
        let n = closes.len() as i64;
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let day = end
                    .checked_add_days(i as i64 - (n - 1))
                    .expect("in range");
                DailyBar::new(day, *close, 2_000_000).expect("bar")
            })
            .collect();
        BarSeries::new(code, bars).expect("series")
    }

    fn scanner_with(responses: BTreeMap<String, Result<BarSeries, SourceError>>) -> MarketScanner {
        let client = MarketDataClient::new(
            Arc::new(MappedSource { responses }),
            RetryPolicy::no_retry(),
        );
        let config = ScanConfig {
            pacing: Duration::from_millis(0),
            progress_every: 0,
            ..ScanConfig::default()
        };
        MarketScanner::new(client, config)
    }

    #[tokio::test]
    async fn failures_are_isolated_per_instrument() {
        let responses = BTreeMap::from([
            (
                "1101".to_owned(),
                Err(SourceError::unavailable("provider down")),
            ),
            ("2330".to_owned(), Ok(breakout_series("2330", session()))),
        ]);
        let scanner = scanner_with(responses);

        let report = scanner.run_for_day(&catalog_of(&["1101", "2330"]), session()).await;

        assert_eq!(report.counters.skipped, 1);
        assert_eq!(report.counters.matched, 1);
        assert_eq!(report.matches()[0].code.as_str(), "2330");
        assert!(!report.market_closed);
    }

    #[tokio::test]
    async fn empty_series_is_skipped_without_aborting() {
        let responses = BTreeMap::from([
            (
                "1101".to_owned(),
                Ok(BarSeries::empty(StockCode::parse("1101").expect("code"))),
            ),
            ("2330".to_owned(), Ok(quiet_series("2330", session()))),
        ]);
        let scanner = scanner_with(responses);

        let report = scanner.run_for_day(&catalog_of(&["1101", "2330"]), session()).await;

        assert_eq!(report.counters.scanned, 2);
        assert_eq!(report.counters.skipped, 1);
        assert_eq!(report.counters.matched, 0);
    }

    #[tokio::test]
    async fn stale_streak_halts_the_run_early() {
        let yesterday = TradingDay::parse("2024-03-06").expect("date");
        let codes: Vec<String> = (0..20).map(|i| format!("{:04}", 1101 + i)).collect();
        let responses: BTreeMap<String, Result<BarSeries, SourceError>> = codes
            .iter()
            .map(|code| (code.clone(), Ok(quiet_series(code, yesterday))))
            .collect();

        let client = MarketDataClient::new(
            Arc::new(MappedSource { responses }),
            RetryPolicy::no_retry(),
        );
        let config = ScanConfig {
            pacing: Duration::from_millis(0),
            stale_threshold: 10,
            progress_every: 0,
            ..ScanConfig::default()
        };
        let scanner = MarketScanner::new(client, config);

        let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
        let report = scanner.run_for_day(&catalog_of(&code_refs), session()).await;

        assert!(report.market_closed);
        // Threshold 10 trips on the 11th consecutive stale instrument.
        assert_eq!(report.counters.scanned, 11);
        assert_eq!(report.counters.stale, 11);
        assert!(report.matches().is_empty());
    }

    #[tokio::test]
    async fn fresh_result_resets_the_stale_streak() {
        let yesterday = TradingDay::parse("2024-03-06").expect("date");
        let codes: Vec<String> = (0..15).map(|i| format!("{:04}", 1101 + i)).collect();
        let mut responses: BTreeMap<String, Result<BarSeries, SourceError>> = codes
            .iter()
            .map(|code| (code.clone(), Ok(quiet_series(code, yesterday))))
            .collect();
        // A fresh instrument in the middle keeps the run alive.
        responses.insert("1106".to_owned(), Ok(quiet_series("1106", session())));

        let scanner = scanner_with(responses);
        let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
        let report = scanner.run_for_day(&catalog_of(&code_refs), session()).await;

        assert!(!report.market_closed);
        assert_eq!(report.counters.scanned, 15);
    }

    #[tokio::test]
    async fn matches_come_back_sorted_by_bias() {
        // Two breakout series with different surge sizes.
        let mut strong = vec![100.0; 18];
        strong.push(99.0);
        strong.push(110.0);
        let mut mild = vec![100.0; 18];
        mild.push(99.0);
        mild.push(103.0);

        let responses = BTreeMap::from([
            (
                "1101".to_owned(),
                Ok(series_from("1101", session(), &strong)),
            ),
            ("2330".to_owned(), Ok(series_from("2330", session(), &mild))),
        ]);
        let scanner = scanner_with(responses);

        let report = scanner.run_for_day(&catalog_of(&["1101", "2330"]), session()).await;

        assert_eq!(report.counters.matched, 2);
        let codes: Vec<&str> = report.matches().iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["2330", "1101"], "mild surge sorts first");
    }
}
