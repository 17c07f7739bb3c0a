//! Market-data collaborators: the `BarSource` trait and its implementations.

pub mod alpaca;
pub mod csv_source;
pub mod provider;
pub mod synthetic;

pub use alpaca::{AlpacaBarSource, AlpacaCredentials};
pub use csv_source::CsvBarSource;
pub use provider::{clean_bars, BarSource, DataError};
pub use synthetic::SyntheticBarSource;
