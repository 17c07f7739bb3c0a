//! Two-day breakout: close above the higher of the last two highs.

use crate::domain::Bar;
use crate::regime::Regime;

use super::Setup;

/// Fires when `close[i] > max(high[i-1], high[i-2])`.
/// Stop sits at `min(low[i-1], low[i-2])`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoDayBreakout;

impl Setup for TwoDayBreakout {
    fn name(&self) -> &str {
        "TwoDayBreakout_D1"
    }

    fn min_index(&self) -> usize {
        2
    }

    fn required_regime(&self) -> Regime {
        Regime::Trend
    }

    fn trigger(&self, bars: &[Bar], i: usize) -> bool {
        if i < self.min_index() || i >= bars.len() {
            return false;
        }
        bars[i].close > bars[i - 1].high.max(bars[i - 2].high)
    }

    fn stop_price(&self, bars: &[Bar], i: usize) -> Option<f64> {
        if i < self.min_index() || i >= bars.len() {
            return None;
        }
        Some(bars[i - 1].low.min(bars[i - 2].low))
    }
}
