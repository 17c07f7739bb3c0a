//! Markdown report for a hot-only assessment.

use std::path::Path;

use crate::config::HotOnlyConfig;
use crate::hot_only::HotOnlyRun;

pub struct AssessmentReportGenerator;

impl AssessmentReportGenerator {
    pub fn generate(&self, run: &HotOnlyRun, config: &HotOnlyConfig, state_path: &Path) -> String {
        let a = &run.assessment;
        let m = &a.metrics;
        let state = &a.state;

        let mut report = format!(
            "# Hot-Only Assessment\n\n\
Pair: `{} {}`\n",
            state.symbol, state.setup_name
        );
        if let Some(ts) = state.updated_ts {
            report.push_str(&format!("Assessed: {}\n", ts.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        report.push_str("\n## Windows\n\n");
        report.push_str("| Window | Trades | Win Rate | Avg R | Median R | Best R | Worst R |\n");
        report.push_str("|--------|--------|----------|-------|----------|--------|---------|\n");
        for (days, result) in &run.windows {
            let s = &result.stats;
            report.push_str(&format!(
                "| {}d | {} | {:.1}% | {:+.2} | {:+.2} | {:+.2} | {:+.2} |\n",
                days,
                s.total_trades,
                s.win_rate * 100.0,
                s.avg_r,
                s.median_r,
                s.best_r,
                s.worst_r
            ));
        }

        let [short, mid, long] = config.windows();
        report.push_str("\n## Thresholds\n\n");
        report.push_str(&format!(
            "- min_trades: {}d={} {}d={} {}d={}\n",
            short, config.min_trades_short, mid, config.min_trades_mid, long, config.min_trades_long
        ));
        report.push_str(&format!(
            "- min_avg_r: {}d={:.2} {}d={:.2} {}d={:.2}\n",
            short, config.min_avg_r_short, mid, config.min_avg_r_mid, long, config.min_avg_r_long
        ));
        report.push_str(&format!("- min_median_r_long: {:.2}\n", config.min_median_r_long));
        report.push_str(&format!(
            "- max_hot_ratio: {:.2} (avg_r floor {:.2})\n",
            config.max_hot_ratio, a.avg_r_floor
        ));
        report.push_str(&format!(
            "- pause: loss_streak >= {} or {} losses in last {}\n",
            config.kill_streak, config.pause_losses, config.pause_lookback
        ));
        report.push_str(&format!(
            "- reactivate: {} new trades and {}d avg_r >= {:.2}\n",
            config.reactivate_min_trades, short, config.reactivate_min_avg_r_short
        ));

        report.push_str("\n## Derived\n\n");
        report.push_str(&format!(
            "- avg_r: {}d={:+.2} {}d={:+.2} {}d={:+.2}\n",
            short, m.avg_r_short, mid, m.avg_r_mid, long, m.avg_r_long
        ));
        report.push_str(&format!("- median_r_long: {:+.2}\n", m.median_r_long));
        report.push_str(&format!("- hot_ratio: {:.2}\n", a.hot_ratio));
        report.push_str(&format!("- executed_trades: {}\n", a.executed_count));
        report.push_str(&format!("- executed_loss_streak: {}\n", a.loss_streak));
        report.push_str(&format!(
            "- recent_losses: {}/{} (pause threshold {})\n",
            a.recent_losses, config.pause_lookback, config.pause_losses
        ));
        report.push_str(&format!("- closed_since_pause: {}\n", a.closed_since_pause));
        report.push_str(&format!("- hot_pause_streak: {}\n", config.kill_streak));
        report.push_str(&format!("- state: `{}`\n", state_path.display()));
        report.push_str(&format!("- hot_paused: {}\n", state.paused));
        let reason = if state.pause_reason.is_empty() {
            "none"
        } else {
            state.pause_reason.as_str()
        };
        report.push_str(&format!("- hot_pause_reason: {}\n", reason));

        report.push_str("\n## Recommendation\n\n");
        report.push_str(&format!("**{}**\n\n", a.recommendation));
        report.push_str(&format!(
            "- hot_only_max_allocation: {:.1}%\n",
            config.hot_max_allocation * 100.0
        ));

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hot_only::{assess, HotOnlyState, WindowMetrics};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use swinglab_core::domain::Outcome;

    fn run_with(realized: &[Outcome], prior: Option<&HotOnlyState>) -> HotOnlyRun {
        let metrics = WindowMetrics {
            trades_short: 6,
            trades_mid: 10,
            trades_long: 25,
            avg_r_short: 0.8,
            avg_r_mid: 0.05,
            avg_r_long: 0.02,
            median_r_long: -0.1,
        };
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 21, 0, 0).unwrap();
        HotOnlyRun {
            windows: BTreeMap::new(),
            assessment: assess(
                "SPY",
                "PrevDayBreakout_D1",
                &metrics,
                realized,
                prior,
                &HotOnlyConfig::default(),
                now,
            ),
        }
    }

    #[test]
    fn report_lists_derived_values_and_recommendation() {
        let config = HotOnlyConfig::default();
        let report = AssessmentReportGenerator.generate(
            &run_with(&[Outcome::Win], None),
            &config,
            Path::new("data/hot_only_state.csv"),
        );
        assert!(report.contains("Pair: `SPY PrevDayBreakout_D1`"));
        assert!(report.contains("- hot_ratio: 16.00"));
        assert!(report.contains("- hot_paused: false"));
        assert!(report.contains("- hot_pause_reason: none"));
        assert!(report.contains("**hot-only**"));
        assert!(report.contains("- hot_only_max_allocation: 25.0%"));
        assert!(report.contains("`data/hot_only_state.csv`"));
    }

    #[test]
    fn paused_report_shows_reason() {
        let report = AssessmentReportGenerator.generate(
            &run_with(&[Outcome::Loss; 5], None),
            &HotOnlyConfig::default(),
            Path::new("state.csv"),
        );
        assert!(report.contains("- hot_paused: true"));
        assert!(report.contains("loss_streak=5"));
        assert!(report.contains("**reject**"));
    }
}
