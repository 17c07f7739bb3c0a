//! Row stores: durable flat-record storage behind one small trait.
//!
//! # Concurrency contract
//!
//! A store has exactly one writer. Updates are read-modify-write: load the full
//! table, change it in memory, then `replace_all`. Nothing here locks the
//! backing file; two processes writing the same store concurrently will lose
//! updates. Writes take `&mut self` so that, within a process, the borrow
//! checker enforces the single writer.
//!
//! `CsvRowStore::replace_all` writes a sibling temp file and renames it over
//! the destination, so readers see either the old table or the new one,
//! never a partial write.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

use swinglab_core::domain::Outcome;

/// Errors from record-store I/O.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Durable storage of flat records of type `R`.
pub trait RowStore<R> {
    /// Every stored row, in stored order. A store that was never written is empty.
    fn load_all(&self) -> Result<Vec<R>, StoreError>;

    /// Append rows after the existing ones.
    fn append(&mut self, rows: &[R]) -> Result<(), StoreError>;

    /// Replace the whole table with `rows`.
    fn replace_all(&mut self, rows: &[R]) -> Result<(), StoreError>;
}

// ─── CSV ─────────────────────────────────────────────────────────────

/// One CSV file with a header row. Columns follow `R`'s field order.
#[derive(Debug, Clone)]
pub struct CsvRowStore<R> {
    path: PathBuf,
    _row: PhantomData<fn() -> R>,
}

impl<R> CsvRowStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<R> RowStore<R> for CsvRowStore<R>
where
    R: Serialize + DeserializeOwned,
{
    fn load_all(&self) -> Result<Vec<R>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| StoreError::csv(&self.path, e))?;
        reader
            .deserialize()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| StoreError::csv(&self.path, e))
    }

    fn append(&mut self, rows: &[R]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| StoreError::csv(&self.path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&self.path, e))?;
        log::debug!("appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    fn replace_all(&mut self, rows: &[R]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let tmp = self.temp_path();
        {
            let mut writer =
                csv::Writer::from_path(&tmp).map_err(|e| StoreError::csv(&tmp, e))?;
            for row in rows {
                writer.serialize(row).map_err(|e| StoreError::csv(&tmp, e))?;
            }
            writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        log::debug!("rewrote {} with {} rows", self.path.display(), rows.len());
        Ok(())
    }
}

// ─── In-memory ───────────────────────────────────────────────────────

/// Vector-backed store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRowStore<R> {
    rows: Vec<R>,
}

impl<R> MemoryRowStore<R> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: Clone> RowStore<R> for MemoryRowStore<R> {
    fn load_all(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.rows.clone())
    }

    fn append(&mut self, rows: &[R]) -> Result<(), StoreError> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn replace_all(&mut self, rows: &[R]) -> Result<(), StoreError> {
        self.rows = rows.to_vec();
        Ok(())
    }
}

// ─── Realized trade journal ──────────────────────────────────────────

/// The columns of the live trade journal the engine reads. Other columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
    pub symbol: String,
    pub setup_name: String,
    #[serde(default)]
    pub entry_ts: String,
    #[serde(default)]
    pub exit_ts: String,
    /// Empty while the trade is still open.
    #[serde(default)]
    pub outcome: String,
}

/// Closed realized outcomes for one (symbol, setup) pair, oldest first.
///
/// Symbols match case-insensitively. Open trades (empty outcome) are skipped;
/// rows are ordered by `exit_ts`, falling back to `entry_ts` when it is empty.
pub fn realized_outcomes(rows: &[JournalRow], symbol: &str, setup_name: &str) -> Vec<Outcome> {
    let mut closed: Vec<(&str, Outcome)> = Vec::new();
    for row in rows {
        if !row.symbol.eq_ignore_ascii_case(symbol) || row.setup_name != setup_name {
            continue;
        }
        let outcome = match row.outcome.trim().to_ascii_lowercase().as_str() {
            "" => continue,
            "win" => Outcome::Win,
            "loss" => Outcome::Loss,
            "scratch" => Outcome::Scratch,
            other => {
                log::warn!("journal: ignoring unknown outcome '{other}' for {symbol} {setup_name}");
                continue;
            }
        };
        let ts = if row.exit_ts.is_empty() {
            row.entry_ts.as_str()
        } else {
            row.exit_ts.as_str()
        };
        closed.push((ts, outcome));
    }
    closed.sort_by(|a, b| a.0.cmp(b.0));
    closed.into_iter().map(|(_, o)| o).collect()
}

/// Trailing run of losses at the end of an outcome sequence.
pub fn loss_streak(outcomes: &[Outcome]) -> usize {
    outcomes
        .iter()
        .rev()
        .take_while(|o| **o == Outcome::Loss)
        .count()
}
