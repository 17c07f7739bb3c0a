//! Portfolio records: candidates, open positions, executed and skipped rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use swinglab_core::domain::{ExitReason, Outcome, SignalId, SimulatedTrade};

/// A simulated trade offered to the allocator, with its resource footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub signal_id: SignalId,
    pub trade: SimulatedTrade,
    pub qty: f64,
    pub entry_notional_usd: f64,
    pub risk_to_stop_usd: f64,
}

impl Candidate {
    pub fn new(trade: SimulatedTrade, qty: f64) -> Self {
        let signal_id = SignalId::derive(&trade.symbol, &trade.setup_name, trade.signal_ts);
        let entry_notional_usd = trade.entry_price * qty;
        let risk_to_stop_usd = (trade.entry_price - trade.stop_price).max(0.0) * qty;
        Self {
            signal_id,
            trade,
            qty,
            entry_notional_usd,
            risk_to_stop_usd,
        }
    }

    pub fn entry_ts(&self) -> NaiveDate {
        self.trade.entry_ts
    }
}

/// An admitted position, alive until a later cohort reaches its exit date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivePosition {
    pub exit_ts: NaiveDate,
    pub entry_notional_usd: f64,
    pub risk_to_stop_usd: f64,
}

impl From<&Candidate> for ActivePosition {
    fn from(c: &Candidate) -> Self {
        Self {
            exit_ts: c.trade.exit_ts,
            entry_notional_usd: c.entry_notional_usd,
            risk_to_stop_usd: c.risk_to_stop_usd,
        }
    }
}

/// Why a candidate was not admitted. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BelowMinRankScore,
    NoSlot,
    CapitalCap,
    RiskCap,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelowMinRankScore => "below_min_rank_score",
            Self::NoSlot => "no_slot",
            Self::CapitalCap => "capital_cap",
            Self::RiskCap => "risk_cap",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open-book state at the moment a candidate was evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub open_slots: usize,
    pub open_exposure_usd: f64,
    pub open_risk_usd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTrade {
    pub candidate: Candidate,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkipRecord {
    pub candidate: Candidate,
    pub score: f64,
    pub skip_reason: SkipReason,
    pub snapshot: BookSnapshot,
}

// ─── Flat CSV rows ───────────────────────────────────────────────────

/// One executed trade, flattened for the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedRow {
    pub signal_id: SignalId,
    pub symbol: String,
    pub setup_name: String,
    pub signal_ts: NaiveDate,
    pub entry_ts: NaiveDate,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub exit_ts: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub r_multiple: f64,
    pub outcome: Outcome,
    pub qty: f64,
    pub entry_notional_usd: f64,
    pub risk_to_stop_usd: f64,
    pub rank_score: f64,
}

impl From<&ExecutedTrade> for ExecutedRow {
    fn from(e: &ExecutedTrade) -> Self {
        let c = &e.candidate;
        let t = &c.trade;
        Self {
            signal_id: c.signal_id.clone(),
            symbol: t.symbol.clone(),
            setup_name: t.setup_name.clone(),
            signal_ts: t.signal_ts,
            entry_ts: t.entry_ts,
            entry_price: t.entry_price,
            stop_price: t.stop_price,
            target_price: t.target_price,
            exit_ts: t.exit_ts,
            exit_price: t.exit_price,
            exit_reason: t.exit_reason,
            r_multiple: t.r_multiple,
            outcome: t.outcome,
            qty: c.qty,
            entry_notional_usd: c.entry_notional_usd,
            risk_to_stop_usd: c.risk_to_stop_usd,
            rank_score: e.score,
        }
    }
}

/// One skipped candidate with the failing constraint and book snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRow {
    pub signal_id: SignalId,
    pub symbol: String,
    pub setup_name: String,
    pub entry_ts: NaiveDate,
    pub exit_ts: NaiveDate,
    pub r_multiple: f64,
    pub entry_notional_usd: f64,
    pub risk_to_stop_usd: f64,
    pub rank_score: f64,
    pub skip_reason: SkipReason,
    pub open_slots: usize,
    pub open_exposure_usd: f64,
    pub open_risk_usd: f64,
}

impl From<&SkipRecord> for SkipRow {
    fn from(s: &SkipRecord) -> Self {
        let c = &s.candidate;
        Self {
            signal_id: c.signal_id.clone(),
            symbol: c.trade.symbol.clone(),
            setup_name: c.trade.setup_name.clone(),
            entry_ts: c.trade.entry_ts,
            exit_ts: c.trade.exit_ts,
            r_multiple: c.trade.r_multiple,
            entry_notional_usd: c.entry_notional_usd,
            risk_to_stop_usd: c.risk_to_stop_usd,
            rank_score: s.score,
            skip_reason: s.skip_reason,
            open_slots: s.snapshot.open_slots,
            open_exposure_usd: s.snapshot.open_exposure_usd,
            open_risk_usd: s.snapshot.open_risk_usd,
        }
    }
}
