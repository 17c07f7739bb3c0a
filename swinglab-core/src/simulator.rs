//! Trade simulator: walks forward from a signal to one simulated outcome.
//!
//! Entry is the open of the bar after the signal. Each following bar is checked
//! for the stop first and the target second, so a bar that touches both counts
//! as a stop-out. If neither is touched within the time stop, the trade exits at
//! the close of the last allowed bar.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, ExitReason, Outcome, SimulatedTrade};
use crate::error::ContractError;
use crate::setups::Setup;

/// Validated simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    risk_multiple: f64,
    time_stop_days: usize,
}

impl SimulationParams {
    pub fn new(risk_multiple: f64, time_stop_days: usize) -> Result<Self, ContractError> {
        if !(risk_multiple > 0.0) || !risk_multiple.is_finite() {
            return Err(ContractError::InvalidRiskMultiple(risk_multiple));
        }
        if time_stop_days < 1 {
            return Err(ContractError::InvalidTimeStop(time_stop_days));
        }
        Ok(Self {
            risk_multiple,
            time_stop_days,
        })
    }

    pub fn risk_multiple(&self) -> f64 {
        self.risk_multiple
    }

    pub fn time_stop_days(&self) -> usize {
        self.time_stop_days
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            risk_multiple: 2.0,
            time_stop_days: 5,
        }
    }
}

/// Simulate the trade following a signal at bar `signal_index`.
///
/// Returns `None` when there is no entry bar, the setup has no stop, or the
/// entry does not sit above the stop (degenerate risk).
pub fn simulate_trade(
    bars: &[Bar],
    signal_index: usize,
    setup: &dyn Setup,
    params: &SimulationParams,
) -> Option<SimulatedTrade> {
    let entry_index = signal_index + 1;
    if entry_index >= bars.len() {
        return None;
    }
    let stop_price = setup.stop_price(bars, signal_index)?;
    let entry_bar = &bars[entry_index];
    let entry_price = entry_bar.open;
    if !(entry_price > stop_price) {
        return None;
    }

    let risk = entry_price - stop_price;
    let target_price = entry_price + params.risk_multiple * risk;
    let last_index = (bars.len() - 1).min(entry_index + params.time_stop_days);

    let mut exit: Option<(usize, f64, ExitReason, f64)> = None;
    for (idx, day) in bars.iter().enumerate().take(last_index + 1).skip(entry_index) {
        if day.low <= stop_price {
            exit = Some((idx, stop_price, ExitReason::StopLoss, -1.0));
            break;
        }
        if day.high >= target_price {
            exit = Some((idx, target_price, ExitReason::TakeProfit, params.risk_multiple));
            break;
        }
    }

    let (exit_index, exit_price, exit_reason, r_multiple) = exit.unwrap_or_else(|| {
        let close = bars[last_index].close;
        let r = (close - entry_price) / risk;
        (last_index, close, ExitReason::time_stop(r), r)
    });

    Some(SimulatedTrade {
        symbol: entry_bar.symbol.clone(),
        setup_name: setup.name().to_string(),
        signal_ts: bars[signal_index].date,
        entry_ts: entry_bar.date,
        entry_price,
        stop_price,
        target_price,
        exit_ts: bars[exit_index].date,
        exit_price,
        exit_reason,
        r_multiple,
        outcome: Outcome::from_r(r_multiple),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setups::test_bars::bars;
    use crate::setups::{MeanReversion, PrevDayBreakout, TwoDayBreakout};

    fn params(rm: f64, days: usize) -> SimulationParams {
        SimulationParams::new(rm, days).unwrap()
    }

    #[test]
    fn params_reject_contract_violations() {
        assert_eq!(
            SimulationParams::new(0.0, 5),
            Err(ContractError::InvalidRiskMultiple(0.0))
        );
        assert!(SimulationParams::new(-1.0, 5).is_err());
        assert!(SimulationParams::new(f64::NAN, 5).is_err());
        assert_eq!(
            SimulationParams::new(2.0, 0),
            Err(ContractError::InvalidTimeStop(0))
        );
    }

    #[test]
    fn take_profit_hit_on_entry_day() {
        // signal at 1: close 103 > high 102. entry = 104, stop = low[0] = 99, risk 5, target 114.
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.5, 103.0),
            (104.0, 115.0, 100.0, 114.5),
        ]);
        let t = simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 5)).unwrap();
        assert_eq!(t.entry_price, 104.0);
        assert_eq!(t.stop_price, 99.0);
        assert_eq!(t.target_price, 114.0);
        assert_eq!(t.exit_reason, ExitReason::TakeProfit);
        assert_eq!(t.r_multiple, 2.0);
        assert_eq!(t.exit_price, 114.0);
        assert_eq!(t.exit_ts, b[2].date);
        assert_eq!(t.outcome, Outcome::Win);
    }

    #[test]
    fn stop_wins_tie_with_target_in_same_bar() {
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.5, 103.0),
            (104.0, 120.0, 98.0, 110.0),
        ]);
        let t = simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 5)).unwrap();
        assert_eq!(t.exit_reason, ExitReason::StopLoss);
        assert_eq!(t.r_multiple, -1.0);
        assert_eq!(t.exit_price, 99.0);
        assert_eq!(t.outcome, Outcome::Loss);
    }

    #[test]
    fn time_stop_exits_at_last_allowed_close() {
        // entry 104 stop 99 risk 5 target 114; time_stop_days = 1 -> bars 2..=3.
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.5, 103.0),
            (104.0, 106.0, 102.0, 105.0),
            (105.0, 107.0, 103.0, 106.5),
            (106.5, 130.0, 106.0, 129.0),
        ]);
        let t = simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 1)).unwrap();
        assert_eq!(t.exit_ts, b[3].date);
        assert_eq!(t.exit_price, 106.5);
        assert!((t.r_multiple - 0.5).abs() < 1e-12);
        assert_eq!(t.exit_reason, ExitReason::TimeStopWin);
    }

    #[test]
    fn time_stop_truncated_by_series_end() {
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.5, 103.0),
            (104.0, 105.0, 101.0, 104.0),
        ]);
        let t = simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 10)).unwrap();
        assert_eq!(t.exit_ts, b[2].date);
        assert_eq!(t.r_multiple, 0.0);
        assert_eq!(t.exit_reason, ExitReason::TimeStopScratch);
        assert_eq!(t.outcome, Outcome::Scratch);
    }

    #[test]
    fn no_entry_bar_means_no_trade() {
        let b = bars(&[(100.0, 102.0, 99.0, 101.0), (101.0, 104.0, 100.5, 103.0)]);
        assert!(simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 5)).is_none());
    }

    #[test]
    fn gap_below_stop_is_discarded() {
        // mean reversion stop = low[1] = 97; entry opens at 96.
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (99.5, 100.0, 97.0, 98.0),
            (96.0, 99.0, 95.0, 98.0),
        ]);
        assert!(simulate_trade(&b, 1, &MeanReversion, &params(2.0, 5)).is_none());
    }

    #[test]
    fn entry_equal_to_stop_is_discarded() {
        let b = bars(&[
            (100.0, 102.0, 99.0, 101.0),
            (101.0, 104.0, 100.5, 103.0),
            (99.0, 105.0, 98.0, 104.0),
        ]);
        assert!(simulate_trade(&b, 1, &PrevDayBreakout, &params(2.0, 5)).is_none());
    }

    #[test]
    fn two_day_breakout_uses_lower_of_two_lows() {
        let b = bars(&[
            (100.0, 104.0, 97.0, 101.0),
            (101.0, 103.0, 99.0, 102.0),
            (102.0, 105.5, 101.0, 105.0),
            (105.0, 106.0, 104.0, 105.5),
        ]);
        let t = simulate_trade(&b, 2, &TwoDayBreakout, &params(1.5, 3)).unwrap();
        assert_eq!(t.stop_price, 97.0);
        assert_eq!(t.target_price, 105.0 + 1.5 * 8.0);
    }
}
