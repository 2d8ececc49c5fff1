//! Result aggregation and tabular output.
//!
//! Matches are ranked ascending by bias: instruments closest to their
//! 20-bar average are "just igniting" and lead the table. The CSV schema
//! is fixed; zero matches still produce a well-formed header-only table so
//! consumers never distinguish "no data" from "no matches" structurally.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::signal::{BreakoutMatch, Trigger};

/// Fixed output column set, in emission order.
pub const COLUMNS: [&str; 10] = [
    "date",
    "code",
    "name",
    "trigger",
    "close",
    "ma5",
    "ma10",
    "ma20",
    "bias_pct",
    "volume_lots",
];

/// Separator between trigger labels when both conditions fired.
pub const TRIGGER_JOIN: &str = " & ";

/// Run-level counters reported alongside the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    /// Instruments in the resolved universe.
    pub universe: usize,
    /// Instruments actually attempted (early stop may truncate).
    pub scanned: usize,
    /// Qualifying matches.
    pub matched: usize,
    /// Fetch failures, empty series, and insufficient history.
    pub skipped: usize,
    /// Fresh-data misses (prior-session bars).
    pub stale: usize,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to replace output file: {0}")]
    Replace(#[from] tempfile::PersistError),
}

/// One run's complete output: ranked matches plus counters.
///
/// Created fresh each run; the previous run's table is fully superseded.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    matches: Vec<BreakoutMatch>,
    pub counters: ScanCounters,
    /// Whether the run halted early on accumulated stale evidence.
    pub market_closed: bool,
}

impl ScanReport {
    pub fn from_matches(
        mut matches: Vec<BreakoutMatch>,
        counters: ScanCounters,
        market_closed: bool,
    ) -> Self {
        matches.sort_by(|a, b| a.bias_pct.total_cmp(&b.bias_pct));
        Self {
            matches,
            counters,
            market_closed,
        }
    }

    pub fn matches(&self) -> &[BreakoutMatch] {
        &self.matches
    }

    /// Render the full table as UTF-8 CSV, header row included.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&COLUMNS.join(","));
        out.push('\n');

        for m in &self.matches {
            let trigger = m
                .triggers
                .iter()
                .map(|t| t.label())
                .collect::<Vec<_>>()
                .join(TRIGGER_JOIN);

            let row = [
                m.day.to_string(),
                m.code.to_string(),
                m.name.clone(),
                trigger,
                format!("{:.2}", m.close),
                format!("{:.2}", m.ma5),
                format!("{:.2}", m.ma10),
                format!("{:.2}", m.ma20),
                format!("{:.2}", m.bias_pct),
                m.volume_lots.to_string(),
            ];

            let encoded: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
            out.push_str(&encoded.join(","));
            out.push('\n');
        }

        out
    }

    /// Atomically replace `path` with this run's table: the file is
    /// written next to the target and renamed over it, so a concurrent
    /// reader never observes a half-written table.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut file = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };

        file.write_all(self.to_csv().as_bytes())?;
        file.flush()?;
        file.persist(path)?;
        Ok(())
    }
}

/// Quote a CSV field only when it needs it.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
