use crate::domain::Candle;
use crate::error::{AnalogError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};

const BINANCE_KLINES_URL: &str = "https://api.binance.com/api/v3/klines";
const PAGE_LIMIT: usize = 1000; // Binance spot max per request

/// Fetch daily klines from Binance spot (no API key needed) and keep one close per UTC date.
pub async fn fetch_daily_candles(symbol: &str, start_time: i64, end_time: i64) -> Result<Vec<Candle>> {
    let client = reqwest::Client::new();
    let mut all_candles: Vec<Candle> = Vec::new();
    let mut current_start = start_time;

    while current_start < end_time {
        let resp = client
            .get(BINANCE_KLINES_URL)
            .query(&[
                ("symbol", symbol),
                ("interval", "1d"),
                ("startTime", &current_start.to_string()),
                ("endTime", &end_time.to_string()),
                ("limit", &PAGE_LIMIT.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalogError::Api(format!(
                "Binance API error {}: {}",
                status, body
            )));
        }

        let data: Vec<Vec<serde_json::Value>> = resp.json().await?;
        if data.is_empty() {
            break;
        }

        all_candles.extend(data.iter().filter_map(|k| parse_kline(k)));

        // Move to next batch
        let last_close_time = data.last().and_then(|k| k.get(6)?.as_i64()).unwrap_or(end_time);
        current_start = last_close_time + 1;

        // Rate limit: be nice to Binance
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }

    Ok(dedup_by_date(all_candles))
}

/// Fetch the last N days of daily candles for a symbol
pub async fn fetch_last_n_days(symbol: &str, days: i64) -> Result<Vec<Candle>> {
    let now = Utc::now();
    let start = now - Duration::days(days);
    let candles = fetch_daily_candles(symbol, start.timestamp_millis(), now.timestamp_millis()).await?;
    tracing::info!(symbol, days, candles = candles.len(), "fetched daily candles");
    Ok(candles)
}

/// Kline row: [open_time, open, high, low, close, volume, close_time, ...]
fn parse_kline(kline: &[serde_json::Value]) -> Option<Candle> {
    if kline.len() < 7 {
        return None;
    }
    let open_time = kline[0].as_i64()?;
    let close: f64 = kline[4].as_str()?.parse().ok()?;
    Some(Candle {
        date: open_time_to_date(open_time)?,
        close,
    })
}

fn open_time_to_date(open_time_ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(open_time_ms).map(|dt| dt.date_naive())
}

/// Sort by date and keep the last candle seen for each date.
pub fn dedup_by_date(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.date);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for c in candles {
        match out.last_mut() {
            Some(prev) if prev.date == c.date => *prev = c,
            _ => out.push(c),
        }
    }
    out
}
