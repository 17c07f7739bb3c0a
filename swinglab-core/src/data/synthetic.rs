//! Synthetic bar source: seeded random walk for offline runs and tests.
//!
//! The walk for a symbol always starts at a fixed origin date, so any
//! `[start, end]` request is a slice of the same series and overlapping
//! windows agree bar for bar.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{BarSource, DataError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct SyntheticBarSource {
    seed: u64,
    origin: NaiveDate,
}

impl SyntheticBarSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            origin: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default(),
        }
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }
}

impl Default for SyntheticBarSource {
    fn default() -> Self {
        Self::new(42)
    }
}

impl BarSource for SyntheticBarSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let symbol = symbol.to_uppercase();
        let mut rng = self.rng_for(&symbol);
        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = self.origin;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price * (1.0 + rng.gen_range(-0.005..0.005));
            let close = open * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            if current >= start {
                bars.push(Bar {
                    symbol: symbol.clone(),
                    date: current,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }

            price = close;
            current += chrono::Duration::days(1);
        }

        Ok(bars)
    }
}
