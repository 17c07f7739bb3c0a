//! Previous-day breakout: close above the prior day's high.

use crate::domain::Bar;
use crate::regime::Regime;

use super::Setup;

/// Fires when `close[i] > high[i-1]`. Stop sits at the prior day's low.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrevDayBreakout;

impl Setup for PrevDayBreakout {
    fn name(&self) -> &str {
        "PrevDayBreakout_D1"
    }

    fn min_index(&self) -> usize {
        1
    }

    fn required_regime(&self) -> Regime {
        Regime::Trend
    }

    fn trigger(&self, bars: &[Bar], i: usize) -> bool {
        if i < self.min_index() || i >= bars.len() {
            return false;
        }
        bars[i].close > bars[i - 1].high
    }

    fn stop_price(&self, bars: &[Bar], i: usize) -> Option<f64> {
        if i < self.min_index() || i >= bars.len() {
            return None;
        }
        Some(bars[i - 1].low)
    }
}
