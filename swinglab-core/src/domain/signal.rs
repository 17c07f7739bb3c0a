//! Signal: a setup's trigger predicate held at a bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::SignalId;

/// An immutable record that a setup fired at `bar_index` of a symbol's series.
///
/// Signals describe the market event only. Whether a trade follows is decided
/// by the simulator (entry bar must exist, risk must be positive) and, in
/// portfolio mode, by the allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_id: SignalId,
    pub symbol: String,
    pub setup_name: String,
    pub bar_index: usize,
    pub signal_ts: NaiveDate,
}

impl Signal {
    pub fn new(symbol: &str, setup_name: &str, bar_index: usize, signal_ts: NaiveDate) -> Self {
        Self {
            signal_id: SignalId::derive(symbol, setup_name, signal_ts),
            symbol: symbol.to_string(),
            setup_name: setup_name.to_string(),
            bar_index,
            signal_ts,
        }
    }
}
