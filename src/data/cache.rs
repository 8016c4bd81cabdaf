use crate::domain::{ensure_chronological, ensure_positive_closes, Candle};
use crate::error::{AnalogError, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Save daily closes to CSV cache
pub fn save_to_csv(candles: &[Candle], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["date", "close"])?;
    for c in candles {
        writer.write_record(&[c.date.format("%Y-%m-%d").to_string(), c.close.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Load daily closes from CSV cache
pub fn load_from_csv(path: &str) -> Result<Vec<Candle>> {
    if !Path::new(path).exists() {
        return Err(AnalogError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Cache file not found: {}", path),
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut candles = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let date: NaiveDate = record[0]
            .trim()
            .parse()
            .map_err(|e| AnalogError::InvalidSeries(format!("row {}: bad date: {}", row + 1, e)))?;
        let close: f64 = record[1]
            .trim()
            .parse()
            .map_err(|e| AnalogError::InvalidSeries(format!("row {}: bad close: {}", row + 1, e)))?;
        if !(close.is_finite() && close > 0.0) {
            return Err(AnalogError::InvalidSeries(format!(
                "row {}: close must be finite and positive, got {}",
                row + 1,
                close
            )));
        }
        candles.push(Candle { date, close });
    }

    ensure_chronological(&candles)?;
    Ok(candles)
}

/// Get cache path for a symbol
pub fn cache_path(symbol: &str, data_dir: &str) -> String {
    format!("{}/{}_1d.csv", data_dir, symbol.to_lowercase())
}

/// Load from cache or fetch
pub async fn load_or_fetch(symbol: &str, days: i64, data_dir: &str) -> Result<Vec<Candle>> {
    let path = cache_path(symbol, data_dir);

    // Daily bars: a cache whose last close is today or yesterday is current.
    if let Ok(candles) = load_from_csv(&path) {
        if let Some(last) = candles.last() {
            let age_days = (chrono::Utc::now().date_naive() - last.date).num_days();
            if age_days <= 1 {
                tracing::info!(symbol, candles = candles.len(), age_days, "using cached candles");
                return Ok(candles);
            }
        }
    }

    let candles = super::fetcher::fetch_last_n_days(symbol, days).await?;
    ensure_positive_closes(&candles)?;

    std::fs::create_dir_all(data_dir)?;
    save_to_csv(&candles, &path)?;
    tracing::info!(symbol, candles = candles.len(), path = %path, "cached candles");

    Ok(candles)
}
