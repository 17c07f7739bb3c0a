//! Persisted hot-only state, one row per (symbol, setup).
//!
//! The table is loaded whole, one key is mutated, and the whole table is
//! written back sorted by key. See `crate::store` for the single-writer
//! contract this relies on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{RowStore, StoreError};

/// Pause bookkeeping for one (symbol, setup) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotOnlyState {
    pub symbol: String,
    pub setup_name: String,
    pub paused: bool,
    #[serde(default)]
    pub pause_reason: String,
    #[serde(default)]
    pub paused_ts: Option<DateTime<Utc>>,
    /// Realized trade count when the pause began.
    #[serde(default)]
    pub close_count_at_pause: usize,
    #[serde(default)]
    pub reactivated_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_ts: Option<DateTime<Utc>>,
}

impl HotOnlyState {
    /// A pair with no history: active, never paused.
    pub fn new(symbol: &str, setup_name: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            setup_name: setup_name.to_string(),
            paused: false,
            pause_reason: String::new(),
            paused_ts: None,
            close_count_at_pause: 0,
            reactivated_ts: None,
            updated_ts: None,
        }
    }

    pub fn key(&self) -> StateKey {
        (self.symbol.to_uppercase(), self.setup_name.clone())
    }
}

pub type StateKey = (String, String);

/// The full state table, keyed by (upper-cased symbol, setup name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotOnlyTable {
    rows: BTreeMap<StateKey, HotOnlyState>,
}

impl HotOnlyTable {
    pub fn load(store: &impl RowStore<HotOnlyState>) -> Result<Self, StoreError> {
        let mut rows = BTreeMap::new();
        for row in store.load_all()? {
            if row.symbol.is_empty() || row.setup_name.is_empty() {
                continue;
            }
            rows.insert(row.key(), row);
        }
        Ok(Self { rows })
    }

    /// Rewrite the whole table, sorted by key.
    pub fn save(&self, store: &mut impl RowStore<HotOnlyState>) -> Result<(), StoreError> {
        let rows: Vec<HotOnlyState> = self.rows.values().cloned().collect();
        store.replace_all(&rows)
    }

    pub fn get(&self, symbol: &str, setup_name: &str) -> Option<&HotOnlyState> {
        self.rows
            .get(&(symbol.to_uppercase(), setup_name.to_string()))
    }

    pub fn upsert(&mut self, state: HotOnlyState) {
        self.rows.insert(state.key(), state);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HotOnlyState> {
        self.rows.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CsvRowStore, MemoryRowStore};
    use chrono::TimeZone;

    #[test]
    fn save_sorts_by_key_and_roundtrips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvRowStore::new(dir.path().join("hot_only_state.csv"));

        let mut table = HotOnlyTable::default();
        let mut paused = HotOnlyState::new("qqq", "MeanReversion_D1");
        paused.paused = true;
        paused.pause_reason = "paused: loss_streak=2 recent_losses=2/4".into();
        paused.paused_ts = Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap());
        paused.close_count_at_pause = 7;
        table.upsert(paused.clone());
        table.upsert(HotOnlyState::new("AAPL", "PrevDayBreakout_D1"));
        table.save(&mut store).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "symbol,setup_name,paused,pause_reason,paused_ts,close_count_at_pause,reactivated_ts,updated_ts"
        );
        assert!(lines[1].starts_with("AAPL,"));
        assert!(lines[2].starts_with("QQQ,"));

        let loaded = HotOnlyTable::load(&store).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.get("QQQ", "MeanReversion_D1"), Some(&paused));
    }

    #[test]
    fn missing_table_is_empty() {
        let store: MemoryRowStore<HotOnlyState> = MemoryRowStore::new();
        assert!(HotOnlyTable::load(&store).unwrap().is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive_on_symbol() {
        let mut table = HotOnlyTable::default();
        table.upsert(HotOnlyState::new("spy", "S"));
        assert!(table.get("SPY", "S").is_some());
        assert!(table.get("spy", "S").is_some());
        assert!(table.get("SPY", "T").is_none());
    }
}
