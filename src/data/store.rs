use super::cache::{cache_path, load_from_csv};
use crate::domain::{ensure_chronological, ensure_positive_closes, Candle};
use crate::error::{AnalogError, Result};
use std::collections::HashMap;

/// Supplies an ascending, date-deduplicated close series per symbol.
pub trait CandleStore {
    fn load(&self, symbol: &str) -> Result<Vec<Candle>>;
}

/// Reads `<data_dir>/<symbol>_1d.csv` files written by the cache.
#[derive(Debug, Clone)]
pub struct CsvCandleStore {
    data_dir: String,
}

impl CsvCandleStore {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl CandleStore for CsvCandleStore {
    fn load(&self, symbol: &str) -> Result<Vec<Candle>> {
        load_from_csv(&cache_path(symbol, &self.data_dir))
    }
}

/// In-memory series keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct MemoryCandleStore {
    series: HashMap<String, Vec<Candle>>,
}

impl MemoryCandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series, rejecting it unless strictly ascending by date with
    /// finite, positive closes.
    pub fn insert(&mut self, symbol: &str, candles: Vec<Candle>) -> Result<()> {
        ensure_chronological(&candles)?;
        ensure_positive_closes(&candles)?;
        self.series.insert(symbol.to_uppercase(), candles);
        Ok(())
    }
}

impl CandleStore for MemoryCandleStore {
    fn load(&self, symbol: &str) -> Result<Vec<Candle>> {
        self.series
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| AnalogError::InvalidSeries(format!("no candles for symbol {}", symbol)))
    }
}
