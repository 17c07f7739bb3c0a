//! Trade statistics: pure functions over a list of simulated trades.
//!
//! Every value is zero for an empty trade list; no metric returns NaN.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use swinglab_core::domain::{Outcome, SimulatedTrade};

/// Summary statistics for one trade set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_r: f64,
    pub median_r: f64,
    pub best_r: f64,
    pub worst_r: f64,
}

impl TradeStats {
    pub fn compute(trades: &[SimulatedTrade]) -> Self {
        let rs: Vec<f64> = trades.iter().map(|t| t.r_multiple).collect();
        Self::from_parts(trades.iter().map(|t| t.outcome), &rs)
    }

    /// Stats from any iterator of trades (e.g. candidates wrapping a trade).
    pub fn compute_iter<'a>(trades: impl IntoIterator<Item = &'a SimulatedTrade>) -> Self {
        let trades: Vec<&SimulatedTrade> = trades.into_iter().collect();
        let rs: Vec<f64> = trades.iter().map(|t| t.r_multiple).collect();
        Self::from_parts(trades.iter().map(|t| t.outcome), &rs)
    }

    fn from_parts(outcomes: impl Iterator<Item = Outcome>, rs: &[f64]) -> Self {
        let (mut wins, mut losses) = (0, 0);
        for outcome in outcomes {
            match outcome {
                Outcome::Win => wins += 1,
                Outcome::Loss => losses += 1,
                Outcome::Scratch => {}
            }
        }
        Self {
            total_trades: rs.len(),
            wins,
            losses,
            win_rate: ratio(wins, rs.len()),
            avg_r: mean(rs),
            median_r: median(rs),
            best_r: rs.iter().copied().reduce(f64::max).unwrap_or(0.0),
            worst_r: rs.iter().copied().reduce(f64::min).unwrap_or(0.0),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Arithmetic mean; 0.0 when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median (average of the middle pair for even lengths); 0.0 when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// ─── Period rollups ─────────────────────────────────────────────────

/// Trades, win rate and average R for one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// `YYYY` for yearly rows, `YYYY-MM` for monthly rows.
    pub period: String,
    pub trades: usize,
    pub win_rate: f64,
    pub avg_r: f64,
}

/// Yearly and monthly rollups keyed by entry date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRollup {
    pub yearly: Vec<PeriodStats>,
    pub monthly: Vec<PeriodStats>,
}

impl TradeRollup {
    pub fn compute(trades: &[SimulatedTrade]) -> Self {
        Self {
            yearly: rollup_by(trades, |t| t.entry_ts.year().to_string()),
            monthly: rollup_by(trades, |t| {
                format!("{}-{:02}", t.entry_ts.year(), t.entry_ts.month())
            }),
        }
    }
}

fn rollup_by<F>(trades: &[SimulatedTrade], key_fn: F) -> Vec<PeriodStats>
where
    F: Fn(&SimulatedTrade) -> String,
{
    let mut groups: BTreeMap<String, Vec<&SimulatedTrade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(key_fn(trade)).or_default().push(trade);
    }
    groups
        .into_iter()
        .map(|(period, group)| {
            let stats = TradeStats::compute_iter(group);
            PeriodStats {
                period,
                trades: stats.total_trades,
                win_rate: stats.win_rate,
                avg_r: stats.avg_r,
            }
        })
        .collect()
}
