//! CSV bar source: one `<SYMBOL>.csv` file per symbol in a directory.
//!
//! Expected header: `date,open,high,low,close[,volume]` with ISO dates.
//! A missing file is an empty series, not an error.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{clean_bars, BarSource, DataError};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvBarRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: PathBuf,
}

impl CsvBarSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_file(path: &Path, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut bars = Vec::new();
        for row in reader.deserialize::<CsvBarRow>() {
            let row = row.map_err(|e| DataError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            bars.push(Bar {
                symbol: symbol.to_string(),
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0),
            });
        }
        Ok(bars)
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn get_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let symbol = symbol.to_uppercase();
        let path = self.path_for(&symbol);
        if !path.exists() {
            log::debug!("no bar file at {}", path.display());
            return Ok(Vec::new());
        }
        let bars = Self::read_file(&path, &symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(clean_bars(&symbol, bars))
    }
}
