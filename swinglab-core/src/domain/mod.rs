//! Domain types for swinglab

pub mod bar;
pub mod ids;
pub mod signal;
pub mod trade;

pub use bar::{normalize_series, Bar};
pub use ids::SignalId;
pub use signal::Signal;
pub use trade::{ExitReason, Outcome, SimulatedTrade};
