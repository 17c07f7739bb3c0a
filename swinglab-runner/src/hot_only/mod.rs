//! Hot-only gate: multi-window assessment of one (symbol, setup) pair against
//! its realized live record, with pause state persisted between runs.

pub mod gate;
pub mod state;

pub use gate::{
    assess, hot_ratio, is_approve, is_hot_only, Assessment, Recommendation, Transition,
    WindowMetrics,
};
pub use state::{HotOnlyState, HotOnlyTable, StateKey};

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use swinglab_core::data::BarSource;
use swinglab_core::SetupRegistry;

use crate::backtest::{run_windows, BacktestResult, RunError};
use crate::config::EngineConfig;
use crate::metrics::TradeStats;
use crate::store::{realized_outcomes, JournalRow};

/// Window backtests plus the assessment built from them.
#[derive(Debug, Clone)]
pub struct HotOnlyRun {
    pub windows: BTreeMap<usize, BacktestResult>,
    pub assessment: Assessment,
}

/// Backtest the configured windows, assess against the journal, and record
/// the new state in `table`. Persisting the table is left to the caller.
#[allow(clippy::too_many_arguments)]
pub fn run_assessment(
    source: &dyn BarSource,
    symbol: &str,
    setup_name: &str,
    end: NaiveDate,
    config: &EngineConfig,
    registry: &SetupRegistry,
    journal: &[JournalRow],
    table: &mut HotOnlyTable,
    now: DateTime<Utc>,
) -> Result<HotOnlyRun, RunError> {
    let cfg = &config.hot_only;
    let setup_name = registry.get(setup_name)?.name().to_string();
    let windows = run_windows(
        source,
        symbol,
        &setup_name,
        end,
        &cfg.windows(),
        config,
        registry,
    )?;
    let stats: BTreeMap<usize, TradeStats> = windows
        .iter()
        .map(|(days, result)| (*days, result.stats.clone()))
        .collect();
    let metrics = WindowMetrics::from_window_stats(&stats, cfg);
    let realized = realized_outcomes(journal, symbol, &setup_name);

    let assessment = assess(
        symbol,
        &setup_name,
        &metrics,
        &realized,
        table.get(symbol, &setup_name),
        cfg,
        now,
    );
    table.upsert(assessment.state.clone());

    Ok(HotOnlyRun {
        windows,
        assessment,
    })
}
