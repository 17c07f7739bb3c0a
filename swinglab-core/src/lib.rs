//! swinglab core: domain types, setup rules, regime filter, trade simulator.
//!
//! This crate holds everything that turns one symbol's daily bars into
//! simulated trades:
//! - Domain types (bars, signals, simulated trades, signal IDs)
//! - Setup rules behind the `Setup` trait, registered by name
//! - SMA trend/range regime filter
//! - Signal detector and bar-by-bar trade simulator
//! - Bar sources (CSV directory, Alpaca, synthetic)

pub mod data;
pub mod detector;
pub mod domain;
pub mod error;
pub mod regime;
pub mod setups;
pub mod simulator;

pub use detector::SignalDetector;
pub use error::ContractError;
pub use regime::{Regime, RegimeFilter};
pub use setups::{Setup, SetupRegistry};
pub use simulator::{simulate_trade, SimulationParams};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types cross threads safely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::SimulatedTrade>();
        require_sync::<domain::SimulatedTrade>();
        require_send::<SetupRegistry>();
        require_sync::<SetupRegistry>();
        require_send::<SignalDetector>();
        require_sync::<SignalDetector>();
        require_send::<RegimeFilter>();
        require_sync::<RegimeFilter>();
    }

    /// Setups see bars and an index only; they cannot observe positions or the allocator.
    #[test]
    fn setup_trait_takes_only_bars_and_index() {
        fn _check(setup: &dyn Setup, bars: &[domain::Bar]) -> (bool, Option<f64>) {
            (setup.trigger(bars, 0), setup.stop_price(bars, 0))
        }
    }
}
