//! Portfolio mode: candidates across symbols × setups, then constrained allocation.

pub mod allocator;
pub mod candidate;
pub mod scoring;

pub use allocator::{Allocation, AllocationSummary, Allocator};
pub use candidate::{
    ActivePosition, BookSnapshot, Candidate, ExecutedRow, ExecutedTrade, SkipReason, SkipRecord,
    SkipRow,
};
pub use scoring::TrailingScorer;

use chrono::NaiveDate;

use swinglab_core::data::BarSource;
use swinglab_core::domain::Signal;
use swinglab_core::SetupRegistry;

use crate::backtest::{build_detector, recent_start, simulate_series, RunError};
use crate::config::EngineConfig;

/// Everything a portfolio run produces.
#[derive(Debug, Clone)]
pub struct PortfolioRun {
    pub signals: Vec<Signal>,
    pub allocation: Allocation,
    /// Symbols skipped for lack of data.
    pub skipped_symbols: Vec<String>,
}

/// Generate candidates for every configured setup on every symbol.
///
/// Symbols with no bars contribute nothing and are listed in the second
/// return value; data-source failures abort the run.
pub fn generate_candidates(
    source: &dyn BarSource,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<(Vec<Signal>, Vec<Candidate>, Vec<String>), RunError> {
    let params = config.simulation.params()?;
    let setups = registry.resolve(&config.simulation.setups)?;
    let detector = build_detector(setups, config)?;

    let mut signals = Vec::new();
    let mut candidates = Vec::new();
    let mut skipped_symbols = Vec::new();

    for symbol in symbols {
        let symbol = symbol.to_uppercase();
        let bars = source.get_bars(&symbol, start, end)?;
        if bars.is_empty() {
            log::warn!("{symbol}: no data between {start} and {end}, skipping");
            skipped_symbols.push(symbol);
            continue;
        }
        let from = recent_start(bars.len(), config.simulation.recent_days);
        let run = simulate_series(&bars, from, &detector, &params);
        log::debug!(
            "{symbol}: {} signals, {} candidates",
            run.signals.len(),
            run.trades.len()
        );
        candidates.extend(
            run.trades
                .into_iter()
                .map(|t| Candidate::new(t, config.simulation.position_size)),
        );
        signals.extend(run.signals);
    }

    Ok((signals, candidates, skipped_symbols))
}

/// Full portfolio run: generate candidates, then allocate under the configured caps.
pub fn run_portfolio(
    source: &dyn BarSource,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
    registry: &SetupRegistry,
) -> Result<PortfolioRun, RunError> {
    let allocator = Allocator::new(config.portfolio.clone(), config.ranking.clone())?;
    let (signals, candidates, skipped_symbols) =
        generate_candidates(source, symbols, start, end, config, registry)?;
    let allocation = allocator.allocate(candidates);
    let s = &allocation.summary;
    log::info!(
        "portfolio: {} candidates, {} executed, {} skipped, fill_rate={:.2}",
        s.total_candidates,
        s.executed_count,
        s.skipped_count,
        s.fill_rate
    );
    Ok(PortfolioRun {
        signals,
        allocation,
        skipped_symbols,
    })
}
