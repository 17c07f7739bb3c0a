use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic signal ID: BLAKE3 over symbol, setup name and signal date.
///
/// The allocator uses it as the last tie-break key, so the same signal must
/// hash to the same ID on every run and platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    /// Hex characters kept from the full digest.
    pub const LEN: usize = 16;

    pub fn derive(symbol: &str, setup_name: &str, signal_date: NaiveDate) -> Self {
        let canonical = format!("{symbol}|{setup_name}|{signal_date}");
        let hex = blake3::hash(canonical.as_bytes()).to_hex();
        Self(hex[..Self::LEN].to_string())
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn derive_is_deterministic() {
        let a = SignalId::derive("SPY", "PrevDayBreakout_D1", d(4));
        let b = SignalId::derive("SPY", "PrevDayBreakout_D1", d(4));
        assert_eq!(a, b);
        assert_eq!(a.0.len(), SignalId::LEN);
    }

    #[test]
    fn derive_changes_with_inputs() {
        let base = SignalId::derive("SPY", "PrevDayBreakout_D1", d(4));
        assert_ne!(base, SignalId::derive("QQQ", "PrevDayBreakout_D1", d(4)));
        assert_ne!(base, SignalId::derive("SPY", "MeanReversion_D1", d(4)));
        assert_ne!(base, SignalId::derive("SPY", "PrevDayBreakout_D1", d(5)));
    }
}
