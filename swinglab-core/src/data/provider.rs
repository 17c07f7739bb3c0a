//! Bar source trait and structured error types.
//!
//! The engine reads market data only through [`BarSource`]. Implementations
//! return bars sorted ascending by date with one bar per date; an empty vector
//! means "no data" and the caller decides whether that is fatal.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{normalize_series, Bar};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed bar file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily bars.
///
/// Calls are synchronous and may block; timeouts and retries are the
/// implementation's business.
pub trait BarSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily bars for `symbol` with `start <= date <= end`.
    fn get_bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<Bar>, DataError>;
}

/// Sort, dedupe and drop insane bars, logging how many were dropped.
pub fn clean_bars(symbol: &str, bars: Vec<Bar>) -> Vec<Bar> {
    let total = bars.len();
    let sane: Vec<Bar> = bars.into_iter().filter(Bar::is_sane).collect();
    if sane.len() < total {
        log::warn!(
            "{symbol}: dropped {} of {total} bars failing OHLC sanity checks",
            total - sane.len()
        );
    }
    normalize_series(sane)
}
