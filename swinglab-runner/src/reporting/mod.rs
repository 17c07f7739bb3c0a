//! Report rendering: markdown for assessments, plain text for terminal
//! summaries, JSON manifests for portfolio runs.

pub mod manifest;
pub mod markdown;
pub mod summary;

pub use manifest::{write_manifest, PortfolioManifest};
pub use markdown::AssessmentReportGenerator;
pub use summary::{backtest_summary, batch_summary, portfolio_summary, rollup_summary};
