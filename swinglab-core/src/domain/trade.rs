//! SimulatedTrade: one hypothetical long trade from entry to exit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a simulated trade closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "SL hit")]
    StopLoss,
    #[serde(rename = "TP hit")]
    TakeProfit,
    #[serde(rename = "time stop win")]
    TimeStopWin,
    #[serde(rename = "time stop loss")]
    TimeStopLoss,
    #[serde(rename = "time stop scratch")]
    TimeStopScratch,
}

impl ExitReason {
    /// Time-stop reason matching the sign of the realized R.
    pub fn time_stop(r_multiple: f64) -> Self {
        match Outcome::from_r(r_multiple) {
            Outcome::Win => Self::TimeStopWin,
            Outcome::Loss => Self::TimeStopLoss,
            Outcome::Scratch => Self::TimeStopScratch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StopLoss => "SL hit",
            Self::TakeProfit => "TP hit",
            Self::TimeStopWin => "time stop win",
            Self::TimeStopLoss => "time stop loss",
            Self::TimeStopScratch => "time stop scratch",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade outcome by sign of the R-multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Scratch,
}

impl Outcome {
    pub fn from_r(r_multiple: f64) -> Self {
        if r_multiple > 0.0 {
            Self::Win
        } else if r_multiple < 0.0 {
            Self::Loss
        } else {
            Self::Scratch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Scratch => "scratch",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete simulated round trip. Long-only: `stop_price < entry_price` always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTrade {
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
}

impl SimulatedTrade {
    /// Per-share risk: entry minus stop.
    pub fn risk(&self) -> f64 {
        self.entry_price - self.stop_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_follows_sign() {
        assert_eq!(Outcome::from_r(0.4), Outcome::Win);
        assert_eq!(Outcome::from_r(-0.1), Outcome::Loss);
        assert_eq!(Outcome::from_r(0.0), Outcome::Scratch);
    }

    #[test]
    fn time_stop_reason_matches_outcome() {
        assert_eq!(ExitReason::time_stop(1.2), ExitReason::TimeStopWin);
        assert_eq!(ExitReason::time_stop(-0.3), ExitReason::TimeStopLoss);
        assert_eq!(ExitReason::time_stop(0.0), ExitReason::TimeStopScratch);
    }

    #[test]
    fn exit_reason_serializes_to_journal_labels() {
        let json = serde_json::to_string(&ExitReason::StopLoss).unwrap();
        assert_eq!(json, "\"SL hit\"");
        let back: ExitReason = serde_json::from_str("\"time stop scratch\"").unwrap();
        assert_eq!(back, ExitReason::TimeStopScratch);
        assert_eq!(serde_json::to_string(&Outcome::Loss).unwrap(), "\"loss\"");
    }
}
