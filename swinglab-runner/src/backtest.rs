//! Backtest runner: detector plus simulator over one symbol's bars.
//!
//! Entry points:
//! - `run_backtest()`: one symbol, one setup, one date range. No data is an error.
//! - `run_windows()`: the same pair over several recent-day windows.
//! - `run_batch()`: symbols × setups × windows; symbols without data are skipped.
//!
//! `simulate_series()` is the shared signal → trade step, also used by the
//! portfolio driver.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use swinglab_core::data::{BarSource, DataError};
use swinglab_core::domain::{Bar, Signal, SimulatedTrade};
use swinglab_core::{simulate_trade, ContractError, Setup, SetupRegistry, SignalDetector, SimulationParams};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::TradeStats;
use crate::store::StoreError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("no historical data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("no backtest windows requested")]
    NoWindows,
}

/// Calendar days fetched per trading day requested, to cover weekends and holidays.
const CALENDAR_DAYS_PER_TRADING_DAY: i64 = 3;

/// What to backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub setup_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Overrides `simulation.recent_days` when set.
    pub recent_days: Option<usize>,
}

impl BacktestRequest {
    pub fn new(symbol: &str, setup_name: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            setup_name: setup_name.to_string(),
            start,
            end,
            recent_days: None,
        }
    }

    /// The last `recent_days` trading days up to `end`.
    pub fn recent(symbol: &str, setup_name: &str, end: NaiveDate, recent_days: usize) -> Self {
        let span = chrono::Duration::days(recent_days as i64 * CALENDAR_DAYS_PER_TRADING_DAY);
        Self {
            recent_days: Some(recent_days),
            ..Self::new(symbol, setup_name, end - span, end)
        }
    }
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub setup_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub recent_days: Option<usize>,
    pub bar_count: usize,
    pub signal_count: usize,
    pub stats: TradeStats,
    pub trades: Vec<SimulatedTrade>,
}

/// Signals and the trades that followed them, for one bar series.
#[derive(Debug, Clone, Default)]
pub struct SeriesRun {
    pub signals: Vec<Signal>,
    pub trades: Vec<SimulatedTrade>,
}

/// First bar of the recent window: the last `recent_days + 2` bars, the
/// window plus the two bars the two-day setup looks back on. `0` when no
/// window is set or the series is shorter.
pub fn recent_start(len: usize, recent_days: Option<usize>) -> usize {
    match recent_days {
        Some(days) => len.saturating_sub(days + 2),
        None => 0,
    }
}

/// Detect signals at bars `from..` and simulate the trade behind each one.
///
/// Bars before `from` are history only: the regime filter and setups see
/// them, but no signal fires on them. Signals without a valid trade (no
/// entry bar, entry at or below stop) are kept in `signals` but produce no
/// trade.
pub fn simulate_series(
    bars: &[Bar],
    from: usize,
    detector: &SignalDetector,
    params: &SimulationParams,
) -> SeriesRun {
    let signals = detector.detect_from(bars, from);
    let mut trades = Vec::new();
    for signal in &signals {
        let Some(setup) = detector
            .setups()
            .iter()
            .find(|s| s.name() == signal.setup_name)
        else {
            continue;
        };
        let setup: &dyn Setup = setup.as_ref();
        if let Some(trade) = simulate_trade(bars, signal.bar_index, setup, params) {
            trades.push(trade);
        }
    }
    SeriesRun { signals, trades }
}

/// Build a detector for `setups` with the configured regime filter.
pub fn build_detector(
    setups: Vec<Arc<dyn Setup>>,
    config: &EngineConfig,
) -> Result<SignalDetector, ContractError> {
    Ok(SignalDetector::new(setups, config.regime.filter()?))
}

/// Run one symbol/setup backtest. Fails on contract violations and on empty data.
pub fn run_backtest(
    source: &dyn BarSource,
    request: &BacktestRequest,
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<BacktestResult, RunError> {
    let params = config.simulation.params()?;
    let setup = registry.get(&request.setup_name)?;
    let detector = build_detector(vec![Arc::clone(&setup)], config)?;

    let bars = source.get_bars(&request.symbol, request.start, request.end)?;
    if bars.is_empty() {
        return Err(RunError::NoData {
            symbol: request.symbol.clone(),
            start: request.start,
            end: request.end,
        });
    }
    let recent_days = request.recent_days.or(config.simulation.recent_days);
    let from = recent_start(bars.len(), recent_days);
    let bar_count = bars.len() - from;

    let run = simulate_series(&bars, from, &detector, &params);
    let stats = TradeStats::compute(&run.trades);
    log::info!(
        "{} {}: {} bars, {} signals, {} trades, win_rate={:.2} avg_r={:.2}",
        request.symbol,
        setup.name(),
        bar_count,
        run.signals.len(),
        stats.total_trades,
        stats.win_rate,
        stats.avg_r,
    );

    Ok(BacktestResult {
        symbol: request.symbol.clone(),
        setup_name: setup.name().to_string(),
        start: request.start,
        end: request.end,
        recent_days,
        bar_count,
        signal_count: run.signals.len(),
        stats,
        trades: run.trades,
    })
}

/// Run the same pair over several recent-day windows ending at `end`.
pub fn run_windows(
    source: &dyn BarSource,
    symbol: &str,
    setup_name: &str,
    end: NaiveDate,
    windows: &[usize],
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<BTreeMap<usize, BacktestResult>, RunError> {
    if windows.is_empty() {
        return Err(RunError::NoWindows);
    }
    let mut results = BTreeMap::new();
    for &window in windows {
        let request = BacktestRequest::recent(symbol, setup_name, end, window);
        results.insert(window, run_backtest(source, &request, config, registry)?);
    }
    Ok(results)
}

/// Backtest every symbol × setup × window. A symbol with no data is logged
/// and skipped; every other error aborts the batch.
pub fn run_batch(
    source: &dyn BarSource,
    symbols: &[String],
    setups: &[String],
    windows: &[usize],
    end: NaiveDate,
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<Vec<BacktestResult>, RunError> {
    if windows.is_empty() {
        return Err(RunError::NoWindows);
    }
    registry.resolve(setups)?;

    let mut results = Vec::new();
    'symbols: for symbol in symbols {
        for setup_name in setups {
            for &window in windows {
                let request = BacktestRequest::recent(symbol, setup_name, end, window);
                match run_backtest(source, &request, config, registry) {
                    Ok(result) => results.push(result),
                    Err(RunError::NoData { symbol, .. }) => {
                        log::warn!("{symbol}: no data, skipping");
                        continue 'symbols;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(results)
}
