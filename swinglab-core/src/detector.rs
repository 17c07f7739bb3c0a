//! Signal detector: runs a set of setups over a bar series, gated by the regime filter.
//!
//! Setups are independent: several can fire on the same bar for the same symbol.
//! Each setup emits at most one signal per bar.

use std::sync::Arc;

use crate::domain::{Bar, Signal};
use crate::regime::RegimeFilter;
use crate::setups::Setup;

pub struct SignalDetector {
    setups: Vec<Arc<dyn Setup>>,
    regime: Option<RegimeFilter>,
}

impl SignalDetector {
    pub fn new(setups: Vec<Arc<dyn Setup>>, regime: Option<RegimeFilter>) -> Self {
        Self { setups, regime }
    }

    pub fn setups(&self) -> &[Arc<dyn Setup>] {
        &self.setups
    }

    /// Signals firing at bar `i`, in setup order.
    pub fn detect_at(&self, bars: &[Bar], i: usize) -> Vec<Signal> {
        if i >= bars.len() {
            return Vec::new();
        }
        let regime = self.regime.map(|f| f.classify(bars, i));
        let mut signals = Vec::new();
        for setup in &self.setups {
            let setup: &dyn Setup = setup.as_ref();
            if !setup.trigger(bars, i) {
                continue;
            }
            if let Some(classified) = regime {
                if !RegimeFilter::allows(setup, classified) {
                    continue;
                }
            }
            signals.push(Signal::new(&bars[i].symbol, setup.name(), i, bars[i].date));
        }
        signals
    }

    /// Signals over the whole series, ordered by bar index then setup order.
    pub fn detect_all(&self, bars: &[Bar]) -> Vec<Signal> {
        self.detect_from(bars, 0)
    }

    /// Signals at bars `from..`, with every earlier bar still visible as history.
    pub fn detect_from(&self, bars: &[Bar], from: usize) -> Vec<Signal> {
        let start = self
            .setups
            .iter()
            .map(|s| s.min_index())
            .min()
            .unwrap_or(0)
            .max(from);
        (start..bars.len())
            .flat_map(|i| self.detect_at(bars, i))
            .collect()
    }
}

impl std::fmt::Debug for SignalDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.setups.iter().map(|s| s.name()).collect();
        f.debug_struct("SignalDetector")
            .field("setups", &names)
            .field("regime", &self.regime)
            .finish()
    }
}
