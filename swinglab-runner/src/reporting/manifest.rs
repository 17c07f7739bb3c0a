//! Portfolio run manifest export (JSON).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::EngineConfig;
use crate::portfolio::{AllocationSummary, PortfolioRun};
use crate::store::StoreError;

/// What was run and what came out, next to the executed/skipped CSVs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioManifest {
    pub generated_at: DateTime<Utc>,
    pub symbols: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub skipped_symbols: Vec<String>,
    pub signal_count: usize,
    pub config: EngineConfig,
    pub summary: AllocationSummary,
}

impl PortfolioManifest {
    pub fn new(
        run: &PortfolioRun,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        config: &EngineConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            symbols: symbols.iter().map(|s| s.to_uppercase()).collect(),
            start,
            end,
            skipped_symbols: run.skipped_symbols.clone(),
            signal_count: run.signals.len(),
            config: config.clone(),
            summary: run.allocation.summary.clone(),
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &PortfolioManifest) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(manifest).map_err(|e| StoreError::json(path, e))?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
    }
    std::fs::write(path, json).map_err(|e| StoreError::io(path, e))
}
