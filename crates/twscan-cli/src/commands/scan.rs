use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use twscan_core::{
    Catalog, Lookback, MarketDataClient, MarketScanner, RetryPolicy, ScanConfig, SignalConfig,
};

use crate::cli::{Cli, ScanArgs};
use crate::error::CliError;

use super::build_source;

pub async fn run(cli: &Cli, args: &ScanArgs, catalog: &Catalog) -> Result<ExitCode, CliError> {
    if catalog.is_empty() {
        return Err(CliError::Command(String::from(
            "reference catalog contains no entries",
        )));
    }
    if args.lot_size == 0 {
        return Err(CliError::Command(String::from(
            "--lot-size must be greater than zero",
        )));
    }

    let lookback = Lookback::from_str(&args.lookback)?;

    let config = ScanConfig {
        lookback,
        pacing: Duration::from_millis(args.pacing_ms),
        stale_threshold: args.stale_threshold,
        signal: SignalConfig {
            volume_floor: args.volume_floor,
            lot_size: args.lot_size,
        },
        retry: RetryPolicy::default(),
        ..ScanConfig::default()
    };

    let source = Arc::new(build_source(cli));
    let client = MarketDataClient::new(source, config.retry.clone());
    let scanner = MarketScanner::new(client, config);

    let report = scanner.run(catalog).await;
    report.write_csv(&args.out)?;

    let c = report.counters;
    eprintln!(
        "scan complete: universe={} scanned={} matched={} skipped={} stale={}{}",
        c.universe,
        c.scanned,
        c.matched,
        c.skipped,
        c.stale,
        if report.market_closed {
            " (stopped early: market appears closed)"
        } else {
            ""
        }
    );
    eprintln!("wrote {}", args.out.display());

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use twscan_core::CatalogEntry;

    use crate::cli::Command;

    use super::*;

    fn offline_cli() -> Cli {
        Cli {
            catalog: PathBuf::from("unused.json"),
            timeout_ms: 5_000,
            offline: true,
            command: Command::Scan(scan_args(PathBuf::from("unused.csv"))),
        }
    }

    fn scan_args(out: PathBuf) -> ScanArgs {
        ScanArgs {
            out,
            lookback: String::from("3mo"),
            pacing_ms: 0,
            stale_threshold: 10,
            volume_floor: 1_000_000,
            lot_size: 1_000,
        }
    }

    fn one_stock_catalog() -> Catalog {
        Catalog::from_entries([(
            "2330",
            CatalogEntry {
                security_type: Catalog::EQUITY_TYPE.to_owned(),
                name: "台積電".to_owned(),
            },
        )])
    }

    #[tokio::test]
    async fn empty_catalog_is_rejected_before_any_fetch() {
        let cli = offline_cli();
        let args = scan_args(PathBuf::from("unused.csv"));

        let err = run(&cli, &args, &Catalog::default())
            .await
            .expect_err("must fail");
        assert!(matches!(err, CliError::Command(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn zero_lot_size_is_rejected() {
        let cli = offline_cli();
        let mut args = scan_args(PathBuf::from("unused.csv"));
        args.lot_size = 0;

        let err = run(&cli, &args, &one_stock_catalog())
            .await
            .expect_err("must fail");
        assert!(matches!(err, CliError::Command(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn unknown_lookback_maps_to_a_validation_exit() {
        let cli = offline_cli();
        let mut args = scan_args(PathBuf::from("unused.csv"));
        args.lookback = String::from("9mo");

        let err = run(&cli, &args, &one_stock_catalog())
            .await
            .expect_err("must fail");
        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn offline_scan_writes_the_result_table() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("result.csv");
        let cli = offline_cli();
        let args = scan_args(out.clone());

        run(&cli, &args, &one_stock_catalog())
            .await
            .expect("offline scan must complete");

        let written = std::fs::read_to_string(&out).expect("table must exist");
        assert!(written.starts_with("date,code,name,trigger"));
    }
}
