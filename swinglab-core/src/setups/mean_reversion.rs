//! Mean reversion: close below the prior day's low.

use crate::domain::Bar;
use crate::regime::Regime;

use super::Setup;

/// Fires when `close[i] < low[i-1]`. Stop sits at the signal bar's own low.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl Setup for MeanReversion {
    fn name(&self) -> &str {
        "MeanReversion_D1"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn required_regime(&self) -> Regime {
        Regime::Range
    }

    fn trigger(&self, bars: &[Bar], i: usize) -> bool {
        if i < self.min_index() || i >= bars.len() {
            return false;
        }
        bars[i].close < bars[i - 1].low
    }

    fn stop_price(&self, bars: &[Bar], i: usize) -> Option<f64> {
        if i < self.min_index() || i >= bars.len() {
            return None;
        }
        Some(bars[i].low)
    }
}
