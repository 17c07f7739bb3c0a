//! Engine configuration: every recognized option in one explicit struct.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! config. `validate()` enforces the contracts the engine relies on and is
//! called by `from_toml_str` / `from_file`; a config that made it through
//! either constructor never fails later on a parameter check.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use swinglab_core::{ContractError, RegimeFilter, SetupRegistry, SimulationParams};

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config TOML: {0}")]
    Parse(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

// ─── Top level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub regime: RegimeConfig,
    pub portfolio: PortfolioConfig,
    pub ranking: RankingConfig,
    pub hot_only: HotOnlyConfig,
    pub entry_gate: EntryGateConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every contract. The first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.params()?;
        SetupRegistry::with_defaults().resolve(&self.simulation.setups)?;
        if !(self.simulation.position_size > 0.0) || !self.simulation.position_size.is_finite() {
            return Err(ConfigError::Invalid {
                field: "simulation.position_size",
                reason: format!("must be > 0, got {}", self.simulation.position_size),
            });
        }
        if self.simulation.recent_days == Some(0) {
            return Err(ConfigError::Invalid {
                field: "simulation.recent_days",
                reason: "must be >= 1 when set".into(),
            });
        }
        self.regime.filter()?;
        self.ranking.validate()?;
        self.hot_only.validate()?;
        Ok(())
    }
}

// ─── Sections ────────────────────────────────────────────────────────

/// Trade simulation parameters shared by every run mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub risk_multiple: f64,
    pub time_stop_days: usize,
    /// Setup names; the `_D1` suffix is optional.
    pub setups: Vec<String>,
    /// Keep only the most recent N trading days (plus two warm-up bars).
    pub recent_days: Option<usize>,
    /// Shares per candidate in portfolio mode.
    pub position_size: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            risk_multiple: 2.0,
            time_stop_days: 5,
            setups: vec!["PrevDayBreakout_D1".to_string()],
            recent_days: None,
            position_size: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn params(&self) -> Result<SimulationParams, ContractError> {
        SimulationParams::new(self.risk_multiple, self.time_stop_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub enabled: bool,
    pub fast_window: usize,
    pub slow_window: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fast_window: 20,
            slow_window: 50,
        }
    }
}

impl RegimeConfig {
    /// The validated filter, or `None` when disabled. Windows are checked
    /// even when disabled so a bad config never hides until someone flips it on.
    pub fn filter(&self) -> Result<Option<RegimeFilter>, ContractError> {
        let filter = RegimeFilter::new(self.fast_window, self.slow_window)?;
        Ok(self.enabled.then_some(filter))
    }
}

/// Global resource caps for the allocator. A cap of 0 (or below) is uncapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub max_open_positions: i64,
    pub max_capital_usd: f64,
    pub max_total_open_risk_usd: f64,
}

impl PortfolioConfig {
    /// The open-slot cap, or `None` when uncapped.
    pub fn slot_cap(&self) -> Option<usize> {
        usize::try_from(self.max_open_positions)
            .ok()
            .filter(|&cap| cap > 0)
    }
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_open_positions: 1,
            max_capital_usd: 0.0,
            max_total_open_risk_usd: 0.0,
        }
    }
}

/// How cohort candidates are scored before greedy admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    TrailingAvgR,
    TrailingBlendedAvgR,
    #[serde(rename = "none")]
    Unranked,
}

impl std::fmt::Display for RankBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TrailingAvgR => "trailing_avg_r",
            Self::TrailingBlendedAvgR => "trailing_blended_avg_r",
            Self::Unranked => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub rank_by: RankBy,
    pub score_lookback_trades: usize,
    pub min_rank_score: f64,
    pub pair_weight: f64,
    pub setup_weight: f64,
    pub symbol_weight: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            rank_by: RankBy::TrailingAvgR,
            score_lookback_trades: 20,
            min_rank_score: 0.0,
            pair_weight: 0.5,
            setup_weight: 0.25,
            symbol_weight: 0.25,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rank_by != RankBy::Unranked && self.score_lookback_trades == 0 {
            return Err(ConfigError::Invalid {
                field: "ranking.score_lookback_trades",
                reason: format!("must be >= 1 when rank_by = {}", self.rank_by),
            });
        }
        if !self.min_rank_score.is_finite() {
            return Err(ConfigError::Invalid {
                field: "ranking.min_rank_score",
                reason: format!("must be finite, got {}", self.min_rank_score),
            });
        }
        for (field, weight) in [
            ("ranking.pair_weight", self.pair_weight),
            ("ranking.setup_weight", self.setup_weight),
            ("ranking.symbol_weight", self.symbol_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {weight}"),
                });
            }
        }
        Ok(())
    }
}

/// Thresholds for the hot-only gate. Windows are short/mid/long in trading days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotOnlyConfig {
    pub short_window_days: usize,
    pub mid_window_days: usize,
    pub long_window_days: usize,
    pub min_trades_short: usize,
    pub min_trades_mid: usize,
    pub min_trades_long: usize,
    pub min_avg_r_short: f64,
    pub min_avg_r_mid: f64,
    pub min_avg_r_long: f64,
    pub min_median_r_long: f64,
    pub max_hot_ratio: f64,
    pub avg_r_floor: f64,
    /// Lower bound applied to `avg_r_floor` itself.
    pub avg_r_floor_min: f64,
    pub kill_streak: usize,
    pub pause_losses: usize,
    pub pause_lookback: usize,
    pub reactivate_min_trades: usize,
    pub reactivate_min_avg_r_short: f64,
    /// Reported allocation ceiling while a pair is hot-only.
    pub hot_max_allocation: f64,
    pub state_path: PathBuf,
}

impl Default for HotOnlyConfig {
    fn default() -> Self {
        Self {
            short_window_days: 30,
            mid_window_days: 90,
            long_window_days: 180,
            min_trades_short: 5,
            min_trades_mid: 8,
            min_trades_long: 20,
            min_avg_r_short: 0.30,
            min_avg_r_mid: 0.10,
            min_avg_r_long: 0.10,
            min_median_r_long: 0.0,
            max_hot_ratio: 2.0,
            avg_r_floor: 0.05,
            avg_r_floor_min: 0.01,
            kill_streak: 2,
            pause_losses: 3,
            pause_lookback: 4,
            reactivate_min_trades: 6,
            reactivate_min_avg_r_short: 0.30,
            hot_max_allocation: 0.25,
            state_path: PathBuf::from("data/hot_only_state.csv"),
        }
    }
}

impl HotOnlyConfig {
    /// Short, mid and long windows in ascending order.
    pub fn windows(&self) -> [usize; 3] {
        [
            self.short_window_days,
            self.mid_window_days,
            self.long_window_days,
        ]
    }

    /// Denominator floor for the hot ratio.
    pub fn effective_avg_r_floor(&self) -> f64 {
        self.avg_r_floor.max(self.avg_r_floor_min)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [short, mid, long] = self.windows();
        if short == 0 || mid <= short || long <= mid {
            return Err(ConfigError::Invalid {
                field: "hot_only windows",
                reason: format!("need 0 < short < mid < long, got {short}/{mid}/{long}"),
            });
        }
        if !(self.avg_r_floor_min > 0.0) {
            return Err(ConfigError::Invalid {
                field: "hot_only.avg_r_floor_min",
                reason: format!("must be > 0, got {}", self.avg_r_floor_min),
            });
        }
        if self.pause_lookback == 0 {
            return Err(ConfigError::Invalid {
                field: "hot_only.pause_lookback",
                reason: "must be >= 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.hot_max_allocation) {
            return Err(ConfigError::Invalid {
                field: "hot_only.hot_max_allocation",
                reason: format!("must be within [0, 1], got {}", self.hot_max_allocation),
            });
        }
        Ok(())
    }
}

/// Pre-trade backtest gate. `days = 0` disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryGateConfig {
    pub days: usize,
    pub min_trades: usize,
    pub min_avg_r: f64,
    pub min_win_rate: f64,
}

impl Default for EntryGateConfig {
    fn default() -> Self {
        Self {
            days: 90,
            min_trades: 15,
            min_avg_r: 0.10,
            min_win_rate: 0.48,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.simulation.risk_multiple, 2.0);
        assert_eq!(config.ranking.rank_by, RankBy::TrailingAvgR);
        assert_eq!(config.hot_only.windows(), [30, 90, 180]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
[simulation]
risk_multiple = 1.5
setups = ["MeanReversion", "TwoDayBreakout_D1"]

[ranking]
rank_by = "trailing_blended_avg_r"

[portfolio]
max_open_positions = 3
"#,
        )
        .unwrap();
        assert_eq!(config.simulation.risk_multiple, 1.5);
        assert_eq!(config.simulation.time_stop_days, 5);
        assert_eq!(config.ranking.rank_by, RankBy::TrailingBlendedAvgR);
        assert_eq!(config.ranking.score_lookback_trades, 20);
        assert_eq!(config.portfolio.max_open_positions, 3);
        assert_eq!(config.portfolio.max_capital_usd, 0.0);
    }

    #[test]
    fn negative_caps_parse_as_uncapped() {
        let config = EngineConfig::from_toml_str(
            "[portfolio]\nmax_open_positions = -1\nmax_capital_usd = -5.0\n",
        )
        .unwrap();
        assert_eq!(config.portfolio.max_open_positions, -1);
        assert_eq!(config.portfolio.slot_cap(), None);
        assert_eq!(config.portfolio.max_capital_usd, -5.0);
        assert_eq!(PortfolioConfig::default().slot_cap(), Some(1));
    }

    #[test]
    fn rank_by_none_parses() {
        let config = EngineConfig::from_toml_str(
            "[ranking]\nrank_by = \"none\"\nscore_lookback_trades = 0\n",
        )
        .unwrap();
        assert_eq!(config.ranking.rank_by, RankBy::Unranked);
    }

    #[test]
    fn contract_violations_are_rejected() {
        let err = EngineConfig::from_toml_str("[simulation]\nrisk_multiple = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Contract(ContractError::InvalidRiskMultiple(_))
        ));

        let err = EngineConfig::from_toml_str("[simulation]\ntime_stop_days = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Contract(ContractError::InvalidTimeStop(0))));

        let err =
            EngineConfig::from_toml_str("[simulation]\nsetups = [\"InsideBar\"]\n").unwrap_err();
        assert!(err.to_string().contains("InsideBar"));

        let err = EngineConfig::from_toml_str("[regime]\nfast_window = 50\nslow_window = 20\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Contract(ContractError::InvalidRegimeWindows { .. })
        ));
    }

    #[test]
    fn empty_ranking_window_is_rejected() {
        let err =
            EngineConfig::from_toml_str("[ranking]\nscore_lookback_trades = 0\n").unwrap_err();
        assert!(err.to_string().contains("score_lookback_trades"));
    }

    #[test]
    fn regime_filter_only_when_enabled() {
        let mut regime = RegimeConfig::default();
        assert_eq!(regime.filter().unwrap(), None);
        regime.enabled = true;
        let filter = regime.filter().unwrap().unwrap();
        assert_eq!((filter.fast_window(), filter.slow_window()), (20, 50));
    }

    #[test]
    fn hot_ratio_floor_never_below_minimum() {
        let mut hot = HotOnlyConfig::default();
        assert_eq!(hot.effective_avg_r_floor(), 0.05);
        hot.avg_r_floor = 0.0;
        assert_eq!(hot.effective_avg_r_floor(), 0.01);
    }

    #[test]
    fn toml_roundtrip() {
        let config = EngineConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/swinglab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
