//! Setup rules: trigger predicate plus initial stop for each named setup.
//!
//! A setup is a small strategy object: it says whether it fires at bar `i`
//! and where the protective stop sits. Setups are registered by name in a
//! [`SetupRegistry`]; adding a setup means registering a new type, never
//! editing an existing one.
//!
//! Index convention: `i` is the latest completed bar, `i - 1` the prior bar,
//! `i - 2` the bar before that. Setups only read `bars[..=i]`.

pub mod mean_reversion;
pub mod prev_day_breakout;
pub mod two_day_breakout;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::Bar;
use crate::error::ContractError;
use crate::regime::Regime;

pub use mean_reversion::MeanReversion;
pub use prev_day_breakout::PrevDayBreakout;
pub use two_day_breakout::TwoDayBreakout;

/// Trait for setup rules.
pub trait Setup: Send + Sync {
    /// Registered name (e.g., "PrevDayBreakout_D1").
    fn name(&self) -> &str;

    /// Smallest bar index at which `trigger` can be evaluated.
    fn min_index(&self) -> usize;

    /// Market regime this setup is allowed to trade in when the regime filter is on.
    fn required_regime(&self) -> Regime;

    /// True when the setup's condition holds at bar `i`.
    fn trigger(&self, bars: &[Bar], i: usize) -> bool;

    /// Initial stop for a signal at bar `i`; `None` if history is insufficient.
    fn stop_price(&self, bars: &[Bar], i: usize) -> Option<f64>;
}

/// Name → setup lookup.
#[derive(Clone, Default)]
pub struct SetupRegistry {
    setups: BTreeMap<String, Arc<dyn Setup>>,
}

impl SetupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three daily setups.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PrevDayBreakout);
        registry.register(TwoDayBreakout);
        registry.register(MeanReversion);
        registry
    }

    pub fn register<S: Setup + 'static>(&mut self, setup: S) {
        self.setups.insert(setup.name().to_string(), Arc::new(setup));
    }

    /// Look a setup up by name. The `_D1` timeframe suffix is optional.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Setup>, ContractError> {
        if let Some(setup) = self.setups.get(name) {
            return Ok(Arc::clone(setup));
        }
        self.setups
            .get(&format!("{name}_D1"))
            .cloned()
            .ok_or_else(|| ContractError::UnknownSetup {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Resolve a list of names, failing on the first unknown one.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Arc<dyn Setup>>, ContractError> {
        if names.is_empty() {
            return Err(ContractError::NoSetups);
        }
        names.iter().map(|n| self.get(n)).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.setups.keys().cloned().collect()
    }
}

impl std::fmt::Debug for SetupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupRegistry")
            .field("setups", &self.names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_bars {
    use crate::domain::Bar;
    use chrono::NaiveDate;

    /// Build bars from (open, high, low, close) tuples on consecutive days.
    pub fn bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        ohlc.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                symbol: "SPY".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_three_setups() {
        let registry = SetupRegistry::with_defaults();
        assert_eq!(
            registry.names(),
            vec!["MeanReversion_D1", "PrevDayBreakout_D1", "TwoDayBreakout_D1"]
        );
    }

    #[test]
    fn lookup_accepts_bare_name() {
        let registry = SetupRegistry::with_defaults();
        assert_eq!(registry.get("TwoDayBreakout").unwrap().name(), "TwoDayBreakout_D1");
        assert_eq!(registry.get("MeanReversion_D1").unwrap().name(), "MeanReversion_D1");
    }

    #[test]
    fn unknown_setup_is_contract_error() {
        let registry = SetupRegistry::with_defaults();
        let err = registry.get("InsideBar").err().unwrap();
        assert!(matches!(err, ContractError::UnknownSetup { .. }));
        assert!(err.to_string().contains("InsideBar"));
    }

    #[test]
    fn resolve_rejects_empty_list() {
        let registry = SetupRegistry::with_defaults();
        assert_eq!(registry.resolve(&[]).err(), Some(ContractError::NoSetups));
    }
}
