//! swinglab runner: backtests, portfolio allocation, hot-only gate, record stores.
//!
//! This crate builds on `swinglab-core` to provide:
//! - Engine configuration (TOML) and validation
//! - Single, multi-window and batch backtests with summary stats and rollups
//! - Portfolio allocator: same-day cohorts, causal trailing-R ranking,
//!   greedy admission under slot/capital/risk caps
//! - Hot-only gate with persisted pause/reactivate state
//! - Entry gate on a recent backtest window
//! - CSV row stores and the realized trade journal
//! - Markdown and text reports

pub mod backtest;
pub mod config;
pub mod entry_gate;
pub mod hot_only;
pub mod metrics;
pub mod portfolio;
pub mod reporting;
pub mod store;

pub use backtest::{
    build_detector, recent_start, run_backtest, run_batch, run_windows, simulate_series,
    BacktestRequest, BacktestResult, RunError, SeriesRun,
};
pub use config::{
    ConfigError, EngineConfig, EntryGateConfig, HotOnlyConfig, PortfolioConfig, RankBy,
    RankingConfig, RegimeConfig, SimulationConfig,
};
pub use entry_gate::{evaluate_entry_gate, passes_entry_gate, EntryGateOutcome};
pub use hot_only::{
    assess, run_assessment, Assessment, HotOnlyRun, HotOnlyState, HotOnlyTable, Recommendation,
    Transition, WindowMetrics,
};
pub use metrics::{PeriodStats, TradeRollup, TradeStats};
pub use portfolio::{
    generate_candidates, run_portfolio, Allocation, AllocationSummary, Allocator, Candidate,
    ExecutedRow, PortfolioRun, SkipReason, SkipRow,
};
pub use store::{
    loss_streak, realized_outcomes, CsvRowStore, JournalRow, MemoryRowStore, RowStore, StoreError,
};
