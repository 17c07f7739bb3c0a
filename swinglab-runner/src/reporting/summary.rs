//! Plain-text summaries for terminal output.

use crate::backtest::BacktestResult;
use crate::metrics::{PeriodStats, TradeRollup, TradeStats};
use crate::portfolio::PortfolioRun;

fn stats_line(label: &str, stats: &TradeStats) -> String {
    format!(
        "{label:<14} trades={} win_rate={:.1}% avg_r={:+.3} median_r={:+.3} best_r={:+.2} worst_r={:+.2}\n",
        stats.total_trades,
        stats.win_rate * 100.0,
        stats.avg_r,
        stats.median_r,
        stats.best_r,
        stats.worst_r
    )
}

/// One line per backtest result.
pub fn backtest_summary(result: &BacktestResult) -> String {
    let window = match result.recent_days {
        Some(days) => format!("{days}d"),
        None => format!("{}..{}", result.start, result.end),
    };
    let label = format!("{} {} {}", result.symbol, result.setup_name, window);
    let mut out = format!(
        "{label}: bars={} signals={}\n",
        result.bar_count, result.signal_count
    );
    out.push_str(&stats_line("  stats", &result.stats));
    out
}

/// Tabular batch summary, one row per result.
pub fn batch_summary(results: &[BacktestResult]) -> String {
    let mut out = format!(
        "{:<8} {:<22} {:>6} {:>7} {:>8} {:>8} {:>8}\n",
        "symbol", "setup", "window", "trades", "win%", "avg_r", "med_r"
    );
    for r in results {
        let window = r
            .recent_days
            .map(|d| format!("{d}d"))
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:<8} {:<22} {:>6} {:>7} {:>7.1}% {:>+8.3} {:>+8.3}\n",
            r.symbol,
            r.setup_name,
            window,
            r.stats.total_trades,
            r.stats.win_rate * 100.0,
            r.stats.avg_r,
            r.stats.median_r
        ));
    }
    out
}

fn period_block(title: &str, rows: &[PeriodStats]) -> String {
    let mut out = format!("{title}\n");
    for row in rows {
        out.push_str(&format!(
            "  {:<8} trades={:<4} win_rate={:>5.1}% avg_r={:+.3}\n",
            row.period,
            row.trades,
            row.win_rate * 100.0,
            row.avg_r
        ));
    }
    out
}

/// Overall stats plus yearly and monthly rollups.
pub fn rollup_summary(stats: &TradeStats, rollup: &TradeRollup) -> String {
    let mut out = stats_line("overall", stats);
    out.push('\n');
    out.push_str(&period_block("yearly", &rollup.yearly));
    out.push('\n');
    out.push_str(&period_block("monthly", &rollup.monthly));
    out
}

/// Executed and skipped counts, skip reasons, fill rate, constrained vs unconstrained.
pub fn portfolio_summary(run: &PortfolioRun) -> String {
    let s = &run.allocation.summary;
    let mut out = format!(
        "signals={} candidates={} cohorts={} executed={} skipped={} fill_rate={:.1}%\n",
        run.signals.len(),
        s.total_candidates,
        s.cohort_count,
        s.executed_count,
        s.skipped_count,
        s.fill_rate * 100.0
    );
    if !s.skip_reasons.is_empty() {
        out.push_str("skip reasons:\n");
        for (reason, count) in &s.skip_reasons {
            out.push_str(&format!("  {reason:<20} {count}\n"));
        }
    }
    out.push_str(&stats_line("constrained", &s.constrained));
    out.push_str(&stats_line("unconstrained", &s.unconstrained));
    if !run.skipped_symbols.is_empty() {
        out.push_str(&format!("no data: {}\n", run.skipped_symbols.join(", ")));
    }
    out
}
