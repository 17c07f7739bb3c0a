//! Entry gate: a recent single-window backtest a pair must pass before a live entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use swinglab_core::data::BarSource;
use swinglab_core::SetupRegistry;

use crate::backtest::{run_backtest, BacktestRequest, BacktestResult, RunError};
use crate::config::{EngineConfig, EntryGateConfig};
use crate::metrics::TradeStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryGateOutcome {
    /// `days = 0`.
    Disabled,
    Passed,
    /// The first threshold that failed, with both values.
    Failed(String),
}

impl EntryGateOutcome {
    pub fn allows_entry(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Check trade count, then avg R, then win rate.
pub fn passes_entry_gate(stats: &TradeStats, gate: &EntryGateConfig) -> EntryGateOutcome {
    if gate.days == 0 {
        return EntryGateOutcome::Disabled;
    }
    if stats.total_trades < gate.min_trades {
        return EntryGateOutcome::Failed(format!(
            "trades {} < {}",
            stats.total_trades, gate.min_trades
        ));
    }
    if stats.avg_r < gate.min_avg_r {
        return EntryGateOutcome::Failed(format!(
            "avg_r {:.2} < {:.2}",
            stats.avg_r, gate.min_avg_r
        ));
    }
    if stats.win_rate < gate.min_win_rate {
        return EntryGateOutcome::Failed(format!(
            "win_rate {:.2} < {:.2}",
            stats.win_rate, gate.min_win_rate
        ));
    }
    EntryGateOutcome::Passed
}

/// Backtest the last `entry_gate.days` trading days and apply the gate.
///
/// Returns `None` for the backtest when the gate is disabled.
pub fn evaluate_entry_gate(
    source: &dyn BarSource,
    symbol: &str,
    setup_name: &str,
    end: NaiveDate,
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<(EntryGateOutcome, Option<BacktestResult>), RunError> {
    let gate = &config.entry_gate;
    if gate.days == 0 {
        return Ok((EntryGateOutcome::Disabled, None));
    }
    let request = BacktestRequest::recent(symbol, setup_name, end, gate.days);
    let result = run_backtest(source, &request, config, registry)?;
    let outcome = passes_entry_gate(&result.stats, gate);
    match &outcome {
        EntryGateOutcome::Failed(reason) => {
            log::info!("entry gate {} {}: blocked ({reason})", result.symbol, result.setup_name)
        }
        _ => log::debug!("entry gate {} {}: passed", result.symbol, result.setup_name),
    }
    Ok((outcome, Some(result)))
}
