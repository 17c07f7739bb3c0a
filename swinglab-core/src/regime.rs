//! Regime filter: trend/range classification from two simple moving averages.
//!
//! The fast and slow SMAs of close are taken over the trailing windows that end
//! at the evaluated bar. Fast above slow is a trend, fast below slow is a range,
//! equal is neutral. With fewer than `slow_window` bars the regime is undefined.
//! Neutral and undefined regimes reject every setup.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::error::ContractError;
use crate::setups::Setup;

/// Market regime at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Trend,
    Range,
    Neutral,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trend => "trend",
            Self::Range => "range",
            Self::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Simple moving average of close over the `window` bars ending at `end` (inclusive).
///
/// Returns `None` when fewer than `window` bars are available or any close is NaN.
pub fn trailing_sma(bars: &[Bar], end: usize, window: usize) -> Option<f64> {
    if window == 0 || end >= bars.len() || end + 1 < window {
        return None;
    }
    let slice = &bars[end + 1 - window..=end];
    let mut sum = 0.0;
    for bar in slice {
        if bar.close.is_nan() {
            return None;
        }
        sum += bar.close;
    }
    Some(sum / window as f64)
}

/// Validated fast/slow SMA regime filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeFilter {
    fast_window: usize,
    slow_window: usize,
}

impl RegimeFilter {
    pub fn new(fast_window: usize, slow_window: usize) -> Result<Self, ContractError> {
        if fast_window < 1 || slow_window <= fast_window {
            return Err(ContractError::InvalidRegimeWindows {
                fast: fast_window,
                slow: slow_window,
            });
        }
        Ok(Self {
            fast_window,
            slow_window,
        })
    }

    pub fn default_params() -> Self {
        Self {
            fast_window: 20,
            slow_window: 50,
        }
    }

    pub fn fast_window(&self) -> usize {
        self.fast_window
    }

    pub fn slow_window(&self) -> usize {
        self.slow_window
    }

    /// Classify bar `i`. `None` means not enough history.
    pub fn classify(&self, bars: &[Bar], i: usize) -> Option<Regime> {
        let fast = trailing_sma(bars, i, self.fast_window)?;
        let slow = trailing_sma(bars, i, self.slow_window)?;
        Some(if fast > slow {
            Regime::Trend
        } else if fast < slow {
            Regime::Range
        } else {
            Regime::Neutral
        })
    }

    /// Whether a setup may fire under the given classification.
    pub fn allows(setup: &dyn Setup, regime: Option<Regime>) -> bool {
        match regime {
            Some(Regime::Neutral) | None => false,
            Some(r) => r == setup.required_regime(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setups::{MeanReversion, PrevDayBreakout, TwoDayBreakout};
    use chrono::NaiveDate;

    fn make_bars_with_close(closes: &[f64]) -> Vec<Bar> {
        let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                symbol: "SPY".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 2.0,
                low: close - 2.0,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn rejects_bad_windows() {
        assert!(RegimeFilter::new(0, 5).is_err());
        assert!(RegimeFilter::new(5, 5).is_err());
        assert!(RegimeFilter::new(6, 5).is_err());
        assert!(RegimeFilter::new(2, 5).is_ok());
    }

    #[test]
    fn trailing_sma_uses_window_ending_at_index() {
        let bars = make_bars_with_close(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert_eq!(trailing_sma(&bars, 3, 2), Some(3.5));
        assert_eq!(trailing_sma(&bars, 1, 3), None);
    }

    #[test]
    fn rising_closes_are_trend() {
        let bars = make_bars_with_close(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let filter = RegimeFilter::new(2, 4).unwrap();
        assert_eq!(filter.classify(&bars, 4), Some(Regime::Trend));
        assert!(RegimeFilter::allows(&PrevDayBreakout, Some(Regime::Trend)));
        assert!(RegimeFilter::allows(&TwoDayBreakout, Some(Regime::Trend)));
        assert!(!RegimeFilter::allows(&MeanReversion, Some(Regime::Trend)));
    }

    #[test]
    fn falling_closes_are_range() {
        let bars = make_bars_with_close(&[14.0, 13.0, 12.0, 11.0, 10.0]);
        let filter = RegimeFilter::new(2, 4).unwrap();
        assert_eq!(filter.classify(&bars, 4), Some(Regime::Range));
        assert!(RegimeFilter::allows(&MeanReversion, Some(Regime::Range)));
        assert!(!RegimeFilter::allows(&PrevDayBreakout, Some(Regime::Range)));
    }

    #[test]
    fn flat_is_neutral_and_rejects_everything() {
        let bars = make_bars_with_close(&[10.0; 6]);
        let filter = RegimeFilter::new(2, 4).unwrap();
        assert_eq!(filter.classify(&bars, 5), Some(Regime::Neutral));
        assert!(!RegimeFilter::allows(&PrevDayBreakout, Some(Regime::Neutral)));
        assert!(!RegimeFilter::allows(&MeanReversion, Some(Regime::Neutral)));
    }

    #[test]
    fn insufficient_history_is_undefined() {
        let bars = make_bars_with_close(&[10.0, 11.0, 12.0]);
        let filter = RegimeFilter::new(2, 4).unwrap();
        assert_eq!(filter.classify(&bars, 2), None);
        assert!(!RegimeFilter::allows(&PrevDayBreakout, None));
    }

    #[test]
    fn classification_ignores_future_bars() {
        let bars = make_bars_with_close(&[10.0, 11.0, 12.0, 13.0, 14.0, 1.0, 1.0]);
        let filter = RegimeFilter::new(2, 4).unwrap();
        assert_eq!(
            filter.classify(&bars, 4),
            filter.classify(&bars[..5], 4)
        );
    }
}
