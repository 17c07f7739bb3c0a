//! Contract violations raised by the core.
//!
//! These are caller bugs or bad configuration, never data conditions: they fail
//! immediately and are never retried or defaulted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    #[error("risk_multiple must be greater than 0, got {0}")]
    InvalidRiskMultiple(f64),

    #[error("time_stop_days must be >= 1, got {0}")]
    InvalidTimeStop(usize),

    #[error("unsupported setup_name '{name}' (known: {known})")]
    UnknownSetup { name: String, known: String },

    #[error("regime windows invalid: fast_window={fast} must be >= 1 and slow_window={slow} must be > fast_window")]
    InvalidRegimeWindows { fast: usize, slow: usize },

    #[error("no setups requested")]
    NoSetups,
}
