//! Reference catalog of listed instruments.
//!
//! The catalog maps raw exchange codes to metadata (security type and
//! display name). It is loaded once at run start and passed explicitly to
//! whatever needs it, so tests can inject a fake catalog.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{StockCode, CODE_LEN};

/// Metadata for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Security type classification as published by the exchange.
    #[serde(rename = "type")]
    pub security_type: String,
    /// Human-readable instrument name.
    pub name: String,
}

/// Failure to resolve the instrument universe. Fatal for the run: the
/// scanner never proceeds with a partial universe.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reference catalog unavailable: {reason}")]
    Unavailable { reason: String },
}

/// In-memory reference catalog keyed by raw exchange code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Security type token marking ordinary common equity in the TWSE
    /// code catalog.
    pub const EQUITY_TYPE: &'static str = "股票";

    pub fn from_entries<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, CatalogEntry)>,
        C: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, entry)| (code.into(), entry))
                .collect(),
        }
    }

    /// Load the catalog from a JSON file mapping code to entry.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|error| CatalogError::Unavailable {
            reason: format!("{}: {error}", path.display()),
        })?;

        let entries: BTreeMap<String, CatalogEntry> =
            serde_json::from_str(&raw).map_err(|error| CatalogError::Unavailable {
                reason: format!("{}: {error}", path.display()),
            })?;

        Ok(Self { entries })
    }

    /// Resolve the scannable universe: ordinary equities with a canonical
    /// four-digit code. Deduplicated and in deterministic (sorted) order.
    pub fn universe(&self) -> Vec<StockCode> {
        self.entries
            .iter()
            .filter(|(code, entry)| {
                entry.security_type == Self::EQUITY_TYPE && code.chars().count() == CODE_LEN
            })
            .filter_map(|(code, _)| StockCode::parse(code).ok())
            .collect()
    }

    /// Display name for a code, falling back to the code itself.
    pub fn display_name<'a>(&'a self, code: &'a StockCode) -> &'a str {
        self.entries
            .get(code.as_str())
            .map(|entry| entry.name.as_str())
            .unwrap_or_else(|| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
