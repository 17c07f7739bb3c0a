//! Hot-only gate: recommendation plus pause/reactivate/graduate transitions.
//!
//! - **approve:** long-window samples and expectancy clear their thresholds and
//!   the short window is not running hot relative to the long one.
//! - **hot-only:** the short window is strong while a longer window is weak.
//! - **reject:** anything else, including a hot-only pair that is paused.
//!
//! State machine per pair (Active / Paused):
//! - Active → Paused: hot-only, and the realized loss streak or the losses in
//!   the last `pause_lookback` realized trades hit their limits.
//! - Paused → Active (reactivated): enough realized trades closed since the
//!   pause and the short window is strong again.
//! - any → Active (graduated): the recommendation is approve. Loss history is
//!   ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use swinglab_core::domain::Outcome;

use super::state::HotOnlyState;
use crate::config::HotOnlyConfig;
use crate::metrics::TradeStats;
use crate::store::loss_streak;

pub const REACTIVATED_REASON: &str = "reactivated by 30d strength + new trade sample";
pub const GRADUATED_REASON: &str = "cleared by stable approve recommendation";

// ─── Inputs ──────────────────────────────────────────────────────────

/// Backtest metrics for the short, mid and long windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub trades_short: usize,
    pub trades_mid: usize,
    pub trades_long: usize,
    pub avg_r_short: f64,
    pub avg_r_mid: f64,
    pub avg_r_long: f64,
    pub median_r_long: f64,
}

impl WindowMetrics {
    /// Pick the configured windows out of a multi-window run. A missing window counts as zeros.
    pub fn from_window_stats(stats: &BTreeMap<usize, TradeStats>, config: &HotOnlyConfig) -> Self {
        let empty = TradeStats::default();
        let get = |days: usize| stats.get(&days).unwrap_or(&empty);
        let [short, mid, long] = config.windows().map(get);
        Self {
            trades_short: short.total_trades,
            trades_mid: mid.total_trades,
            trades_long: long.total_trades,
            avg_r_short: short.avg_r,
            avg_r_mid: mid.avg_r,
            avg_r_long: long.avg_r,
            median_r_long: long.median_r,
        }
    }
}

// ─── Outputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "approve")]
    Approve,
    #[serde(rename = "hot-only")]
    HotOnly,
    #[serde(rename = "reject")]
    Reject,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::HotOnly => "hot-only",
            Self::Reject => "reject",
        })
    }
}

/// What this assessment did to the pair's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Unchanged,
    Paused,
    Reactivated,
    Graduated,
}

/// Everything derived in one assessment, plus the state to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub metrics: WindowMetrics,
    pub avg_r_floor: f64,
    pub hot_ratio: f64,
    pub approve: bool,
    pub hot_only: bool,
    pub executed_count: usize,
    pub loss_streak: usize,
    pub recent_losses: usize,
    pub closed_since_pause: usize,
    pub recommendation: Recommendation,
    pub transition: Transition,
    pub state: HotOnlyState,
}

// ─── Decision ────────────────────────────────────────────────────────

/// `avg_r_short / max(avg_r_long, floor)`.
pub fn hot_ratio(metrics: &WindowMetrics, config: &HotOnlyConfig) -> f64 {
    metrics.avg_r_short / metrics.avg_r_long.max(config.effective_avg_r_floor())
}

pub fn is_approve(metrics: &WindowMetrics, config: &HotOnlyConfig) -> bool {
    metrics.trades_mid >= config.min_trades_mid
        && metrics.trades_long >= config.min_trades_long
        && metrics.avg_r_long >= config.min_avg_r_long
        && metrics.median_r_long >= config.min_median_r_long
        && hot_ratio(metrics, config) <= config.max_hot_ratio
}

pub fn is_hot_only(metrics: &WindowMetrics, config: &HotOnlyConfig) -> bool {
    metrics.trades_short >= config.min_trades_short
        && metrics.avg_r_short >= config.min_avg_r_short
        && (metrics.avg_r_mid < config.min_avg_r_mid || metrics.avg_r_long < config.min_avg_r_long)
}

/// Assess one pair.
///
/// `realized` is the pair's closed live outcomes, oldest first. `prior` is the
/// stored state, if any; absence means active with no pause history.
pub fn assess(
    symbol: &str,
    setup_name: &str,
    metrics: &WindowMetrics,
    realized: &[Outcome],
    prior: Option<&HotOnlyState>,
    config: &HotOnlyConfig,
    now: DateTime<Utc>,
) -> Assessment {
    let mut state = prior
        .cloned()
        .unwrap_or_else(|| HotOnlyState::new(symbol, setup_name));

    let approve = is_approve(metrics, config);
    let hot_only = is_hot_only(metrics, config);
    let ratio = hot_ratio(metrics, config);

    let executed_count = realized.len();
    let streak = loss_streak(realized);
    let lookback_start = executed_count.saturating_sub(config.pause_lookback);
    let recent_losses = realized[lookback_start..]
        .iter()
        .filter(|o| **o == Outcome::Loss)
        .count();
    let closed_since_pause = executed_count.saturating_sub(state.close_count_at_pause);

    let mut transition = Transition::Unchanged;
    if approve {
        if state.paused {
            state.paused = false;
            state.pause_reason = GRADUATED_REASON.to_string();
            transition = Transition::Graduated;
        }
    } else if hot_only {
        if state.paused {
            let can_reactivate = closed_since_pause >= config.reactivate_min_trades
                && metrics.trades_short >= config.min_trades_short
                && metrics.avg_r_short >= config.reactivate_min_avg_r_short;
            if can_reactivate {
                state.paused = false;
                state.pause_reason = REACTIVATED_REASON.to_string();
                state.reactivated_ts = Some(now);
                transition = Transition::Reactivated;
            }
        } else if streak >= config.kill_streak || recent_losses >= config.pause_losses {
            state.paused = true;
            state.close_count_at_pause = executed_count;
            state.pause_reason = format!(
                "paused: loss_streak={streak} recent_losses={recent_losses}/{}",
                config.pause_lookback
            );
            state.paused_ts = Some(now);
            transition = Transition::Paused;
        }
    }
    state.updated_ts = Some(now);

    let recommendation = if approve {
        Recommendation::Approve
    } else if hot_only && !state.paused {
        Recommendation::HotOnly
    } else {
        Recommendation::Reject
    };

    if transition != Transition::Unchanged {
        log::info!(
            "hot-only {} {}: {:?} ({})",
            state.symbol,
            state.setup_name,
            transition,
            state.pause_reason
        );
    }

    Assessment {
        metrics: metrics.clone(),
        avg_r_floor: config.effective_avg_r_floor(),
        hot_ratio: ratio,
        approve,
        hot_only,
        executed_count,
        loss_streak: streak,
        recent_losses,
        closed_since_pause: executed_count.saturating_sub(state.close_count_at_pause),
        recommendation,
        transition,
        state,
    }
}
