//! Causal trailing-R scoring.
//!
//! A candidate entering on day T is scored only from trades that exited
//! strictly before T. History is indexed per pair, per setup and per symbol,
//! each list sorted by exit date, so the cut-off is one binary search.

use chrono::NaiveDate;
use std::collections::HashMap;

use swinglab_core::domain::SimulatedTrade;

use super::candidate::Candidate;
use crate::config::{RankBy, RankingConfig};
use crate::metrics::mean;

type History = Vec<(NaiveDate, f64)>;

/// Trailing-expectancy scorer over a fixed history of closed trades.
#[derive(Debug, Clone)]
pub struct TrailingScorer {
    rank_by: RankBy,
    lookback: usize,
    weights: [f64; 3],
    by_pair: HashMap<(String, String), History>,
    by_setup: HashMap<String, History>,
    by_symbol: HashMap<String, History>,
}

impl TrailingScorer {
    /// Index `history`. Input order does not matter.
    pub fn new<'a>(
        history: impl IntoIterator<Item = &'a SimulatedTrade>,
        ranking: &RankingConfig,
    ) -> Self {
        let mut by_pair: HashMap<(String, String), History> = HashMap::new();
        let mut by_setup: HashMap<String, History> = HashMap::new();
        let mut by_symbol: HashMap<String, History> = HashMap::new();

        let mut trades: Vec<&SimulatedTrade> = history.into_iter().collect();
        trades.sort_by(|a, b| {
            (a.exit_ts, a.entry_ts, &a.symbol, &a.setup_name)
                .cmp(&(b.exit_ts, b.entry_ts, &b.symbol, &b.setup_name))
        });
        for t in trades {
            let point = (t.exit_ts, t.r_multiple);
            by_pair
                .entry((t.symbol.clone(), t.setup_name.clone()))
                .or_default()
                .push(point);
            by_setup.entry(t.setup_name.clone()).or_default().push(point);
            by_symbol.entry(t.symbol.clone()).or_default().push(point);
        }

        Self {
            rank_by: ranking.rank_by,
            lookback: ranking.score_lookback_trades,
            weights: [
                ranking.pair_weight,
                ranking.setup_weight,
                ranking.symbol_weight,
            ],
            by_pair,
            by_setup,
            by_symbol,
        }
    }

    pub fn score(&self, candidate: &Candidate) -> f64 {
        let t = &candidate.trade;
        let before = t.entry_ts;
        match self.rank_by {
            RankBy::Unranked => 0.0,
            RankBy::TrailingAvgR => self.pair_avg(&t.symbol, &t.setup_name, before),
            RankBy::TrailingBlendedAvgR => {
                let [w_pair, w_setup, w_symbol] = self.weights;
                w_pair * self.pair_avg(&t.symbol, &t.setup_name, before)
                    + w_setup * trailing_avg(self.by_setup.get(&t.setup_name), before, self.lookback)
                    + w_symbol * trailing_avg(self.by_symbol.get(&t.symbol), before, self.lookback)
            }
        }
    }

    fn pair_avg(&self, symbol: &str, setup_name: &str, before: NaiveDate) -> f64 {
        let key = (symbol.to_string(), setup_name.to_string());
        trailing_avg(self.by_pair.get(&key), before, self.lookback)
    }
}

/// Mean R of the last `lookback` points with exit date < `before`; 0.0 if none.
fn trailing_avg(history: Option<&History>, before: NaiveDate, lookback: usize) -> f64 {
    let Some(points) = history else {
        return 0.0;
    };
    let end = points.partition_point(|(exit, _)| *exit < before);
    let start = end.saturating_sub(lookback);
    let rs: Vec<f64> = points[start..end].iter().map(|(_, r)| *r).collect();
    mean(&rs)
}
