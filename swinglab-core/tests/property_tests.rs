//! Property tests for simulator invariants.
//!
//! Uses proptest to verify, over random bar series and every setup:
//! 1. stop_price < entry_price for every produced trade
//! 2. Stop-loss exits carry exactly -1R, take-profit exits exactly +risk_multiple
//! 3. Time-stop exits agree with their outcome label
//! 4. The exit never lands beyond the time stop or before the entry

use chrono::NaiveDate;
use proptest::prelude::*;
use swinglab_core::domain::{Bar, ExitReason, Outcome};
use swinglab_core::{simulate_trade, SetupRegistry, SignalDetector, SimulationParams};

// ── Strategies (proptest) ────────────────────────────────────────────

/// (daily return, open gap, upper wick, lower wick) per bar.
fn arb_bar_steps() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec(
        (-0.04..0.04_f64, -0.01..0.01_f64, 0.0..0.02_f64, 0.0..0.02_f64),
        3..80,
    )
}

fn arb_risk_multiple() -> impl Strategy<Value = f64> {
    (0.25..4.0_f64).prop_map(|r| (r * 4.0).round() / 4.0)
}

fn build_bars(steps: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut price = 100.0_f64;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(ret, gap, up, down))| {
            let open = price * (1.0 + gap);
            let close = open * (1.0 + ret);
            price = close;
            Bar {
                symbol: "PROP".into(),
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + up),
                low: open.min(close) * (1.0 - down),
                close,
                volume: 1000,
            }
        })
        .collect()
}

// ── Trade invariants ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_trade_respects_exit_invariants(
        steps in arb_bar_steps(),
        risk_multiple in arb_risk_multiple(),
        time_stop_days in 1usize..10,
    ) {
        let bars = build_bars(&steps);
        let registry = SetupRegistry::with_defaults();
        let params = SimulationParams::new(risk_multiple, time_stop_days).unwrap();
        let detector = SignalDetector::new(registry.resolve(&registry.names()).unwrap(), None);

        for signal in detector.detect_all(&bars) {
            let setup = registry.get(&signal.setup_name).unwrap();
            let Some(trade) = simulate_trade(&bars, signal.bar_index, setup.as_ref(), &params) else {
                continue;
            };

            prop_assert!(trade.stop_price < trade.entry_price);
            prop_assert!(trade.risk() > 0.0);
            prop_assert_eq!(trade.entry_ts, bars[signal.bar_index + 1].date);
            prop_assert!(trade.exit_ts >= trade.entry_ts);

            let max_exit = (bars.len() - 1).min(signal.bar_index + 1 + time_stop_days);
            prop_assert!(trade.exit_ts <= bars[max_exit].date);

            match trade.exit_reason {
                ExitReason::StopLoss => {
                    prop_assert_eq!(trade.r_multiple, -1.0);
                    prop_assert_eq!(trade.exit_price, trade.stop_price);
                    prop_assert_eq!(trade.outcome, Outcome::Loss);
                }
                ExitReason::TakeProfit => {
                    prop_assert_eq!(trade.r_multiple, risk_multiple);
                    prop_assert_eq!(trade.exit_price, trade.target_price);
                    prop_assert_eq!(trade.outcome, Outcome::Win);
                }
                ExitReason::TimeStopWin => {
                    prop_assert!(trade.r_multiple > 0.0);
                    prop_assert_eq!(trade.outcome, Outcome::Win);
                }
                ExitReason::TimeStopLoss => {
                    prop_assert!(trade.r_multiple < 0.0);
                    prop_assert_eq!(trade.outcome, Outcome::Loss);
                }
                ExitReason::TimeStopScratch => {
                    prop_assert_eq!(trade.r_multiple, 0.0);
                    prop_assert_eq!(trade.outcome, Outcome::Scratch);
                }
            }
        }
    }

    /// Target sits exactly risk_multiple risk-units above entry.
    #[test]
    fn target_is_entry_plus_multiple_of_risk(
        steps in arb_bar_steps(),
        risk_multiple in arb_risk_multiple(),
    ) {
        let bars = build_bars(&steps);
        let registry = SetupRegistry::with_defaults();
        let params = SimulationParams::new(risk_multiple, 5).unwrap();
        for name in registry.names() {
            let setup = registry.get(&name).unwrap();
            for i in setup.min_index()..bars.len() {
                if let Some(t) = simulate_trade(&bars, i, setup.as_ref(), &params) {
                    let expected = t.entry_price + risk_multiple * (t.entry_price - t.stop_price);
                    prop_assert!((t.target_price - expected).abs() < 1e-9);
                }
            }
        }
    }
}

// ── Scenario ─────────────────────────────────────────────────────────

/// Three bars, close[1] > high[0]: breakout fires at 1, enters at open[2],
/// and bar 2 reaches the target without touching the stop.
#[test]
fn three_bar_breakout_hits_target() {
    let steps = [
        (100.0, 102.0, 99.0, 101.0),
        (101.0, 104.0, 100.5, 103.0),
        (104.0, 116.0, 103.0, 104.0),
    ];
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars: Vec<Bar> = steps
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            symbol: "SPY".into(),
            date: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 0,
        })
        .collect();

    let registry = SetupRegistry::with_defaults();
    let setup = registry.get("PrevDayBreakout").unwrap();
    let detector = SignalDetector::new(vec![setup.clone()], None);
    let signals = detector.detect_all(&bars);
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].bar_index, 1);

    let params = SimulationParams::new(2.0, 5).unwrap();
    let trade = simulate_trade(&bars, 1, setup.as_ref(), &params).unwrap();
    assert_eq!(trade.entry_price, 104.0);
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_eq!(trade.exit_reason.to_string(), "TP hit");
    assert_eq!(trade.r_multiple, 2.0);
}
