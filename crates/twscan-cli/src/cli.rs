//! CLI argument definitions for twscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run the daily breakout scan and write the result table |
//! | `universe` | Print the resolved instrument universe |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--catalog` | `catalog.json` | Reference catalog file |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--offline` | `false` | Use deterministic offline data |
//!
//! # Examples
//!
//! ```bash
//! # Daily scan with defaults
//! twscan scan
//!
//! # Faster dry run against offline data
//! twscan scan --offline --pacing-ms 0 --out /tmp/result.csv
//!
//! # Inspect the universe the scan would walk
//! twscan universe --names
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Taiwan stock exchange daily breakout scanner.
///
/// Resolves the listed-equity universe from a reference catalog, fetches
/// recent daily bars per instrument, evaluates moving-average breakout
/// conditions and writes a ranked CSV table.
#[derive(Debug, Parser)]
#[command(
    name = "twscan",
    author,
    version,
    about = "TWSE daily moving-average breakout scanner"
)]
pub struct Cli {
    /// Path to the reference catalog JSON (code to type/name mapping).
    #[arg(long, global = true, default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Per-request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Use deterministic offline data instead of the live provider.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the daily scan and write the result table.
    Scan(ScanArgs),
    /// Print the resolved instrument universe.
    Universe(UniverseArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Output CSV path, replaced atomically on success.
    #[arg(long, default_value = "result.csv")]
    pub out: PathBuf,

    /// Lookback window for fetched history (1mo, 2mo, 3mo, 6mo).
    #[arg(long, default_value = "3mo")]
    pub lookback: String,

    /// Minimum delay between consecutive provider requests, in ms.
    #[arg(long, default_value_t = 1_500)]
    pub pacing_ms: u64,

    /// Consecutive stale instruments tolerated before presuming the
    /// market closed and stopping early.
    #[arg(long, default_value_t = 10)]
    pub stale_threshold: u32,

    /// Minimum session volume in raw shares (strictly greater-than).
    #[arg(long, default_value_t = 1_000_000)]
    pub volume_floor: u64,

    /// Shares per reporting lot.
    #[arg(long, default_value_t = 1_000)]
    pub lot_size: u64,
}

#[derive(Debug, Args)]
pub struct UniverseArgs {
    /// Print display names next to codes.
    #[arg(long, default_value_t = false)]
    pub names: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn scan_defaults_match_the_documented_policy() {
        let cli = Cli::try_parse_from(["twscan", "scan"]).expect("must parse");

        assert_eq!(cli.catalog.to_str(), Some("catalog.json"));
        assert_eq!(cli.timeout_ms, 10_000);
        assert!(!cli.offline);

        let Command::Scan(args) = cli.command else {
            panic!("expected the scan subcommand");
        };
        assert_eq!(args.out.to_str(), Some("result.csv"));
        assert_eq!(args.lookback, "3mo");
        assert_eq!(args.pacing_ms, 1_500);
        assert_eq!(args.stale_threshold, 10);
        assert_eq!(args.volume_floor, 1_000_000);
        assert_eq!(args.lot_size, 1_000);
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from(["twscan", "universe", "--names", "--offline"])
            .expect("must parse");

        assert!(cli.offline);
        let Command::Universe(args) = cli.command else {
            panic!("expected the universe subcommand");
        };
        assert!(args.names);
    }

    #[test]
    fn unknown_subcommands_are_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["twscan", "backtest"]).is_err());
    }
}
