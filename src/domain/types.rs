use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Daily close as supplied by the candle store. Other OHLCV fields are not used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub close: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Extract the close column of a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Calendar-decade label of a date: 1994-05-01 -> "1990s".
pub fn decade_bucket(date: NaiveDate) -> String {
    let decade = date.year().div_euclid(10) * 10;
    format!("{}s", decade)
}

/// A scanned historical window and its shape similarity to the current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub start_index: usize,
    pub end_date: NaiveDate,
    pub similarity: f64,
    pub decade_bucket: String,
}

impl Match {
    pub fn end_index(&self, window_len: usize) -> usize {
        self.start_index + window_len - 1
    }
}

/// A selected match plus the returns that followed it.
/// `aftermath_returns[t]` is the fractional return of close `t+1` days after the
/// window relative to the window's last close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWithAftermath {
    #[serde(flatten)]
    pub matched: Match,
    pub aftermath_returns: Vec<f64>,
}

/// Per-step percentile bands across aftermath paths. All four have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    pub p10: Vec<f64>,
    pub p50: Vec<f64>,
    pub p90: Vec<f64>,
    pub mean: Vec<f64>,
}

impl PercentileBands {
    pub fn len(&self) -> usize {
        self.p50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p50.is_empty()
    }

    pub fn is_ordered(&self) -> bool {
        (0..self.len()).all(|t| self.p10[t] <= self.p50[t] && self.p50[t] <= self.p90[t])
    }
}

/// One dated point of a forecast path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Steps ahead of the anchor, starting at 1.
    pub t: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub pct_from_start: f64,
}

/// Reject closes that are NaN, infinite, zero or negative.
pub fn ensure_positive_closes(candles: &[Candle]) -> crate::Result<()> {
    match candles.iter().position(|c| !(c.close.is_finite() && c.close > 0.0)) {
        Some(i) => Err(crate::AnalogError::InvalidSeries(format!(
            "candle {} ({}) has invalid close {}",
            i, candles[i].date, candles[i].close
        ))),
        None => Ok(()),
    }
}

/// Reject series that are not strictly ascending by date (unsorted or duplicated).
pub fn ensure_chronological(candles: &[Candle]) -> crate::Result<()> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(crate::AnalogError::InvalidSeries(format!(
                "candle {} ({}) does not follow {} ({})",
                i + 1,
                pair[1].date,
                i,
                pair[0].date
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_decade_bucket() {
        assert_eq!(decade_bucket(d(1994, 5, 1)), "1990s");
        assert_eq!(decade_bucket(d(2000, 1, 1)), "2000s");
        assert_eq!(decade_bucket(d(2019, 12, 31)), "2010s");
        assert_eq!(decade_bucket(d(2024, 6, 15)), "2020s");
    }

    #[test]
    fn test_match_end_index() {
        let m = Match {
            start_index: 10,
            end_date: d(2001, 1, 1),
            similarity: 0.9,
            decade_bucket: "2000s".into(),
        };
        assert_eq!(m.end_index(120), 129);
    }

    #[test]
    fn test_closes_extraction() {
        let candles = vec![Candle::new(d(2020, 1, 1), 1.0), Candle::new(d(2020, 1, 2), 2.5)];
        assert_eq!(closes(&candles), vec![1.0, 2.5]);
    }

    #[test]
    fn test_bands_ordering_check() {
        let bands = PercentileBands {
            p10: vec![-1.0, 0.0],
            p50: vec![0.0, 0.0],
            p90: vec![1.0, -0.5],
            mean: vec![0.0, 0.0],
        };
        assert_eq!(bands.len(), 2);
        assert!(!bands.is_ordered());
    }

    #[test]
    fn test_ensure_chronological_rejects_duplicates() {
        let candles = vec![
            Candle::new(d(2020, 1, 1), 1.0),
            Candle::new(d(2020, 1, 1), 1.1),
        ];
        assert!(ensure_chronological(&candles).is_err());
    }

    #[test]
    fn test_ensure_positive_closes() {
        let ok = vec![Candle::new(d(2020, 1, 1), 0.01), Candle::new(d(2020, 1, 2), 5.0)];
        assert!(ensure_positive_closes(&ok).is_ok());
        assert!(ensure_positive_closes(&[]).is_ok());

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -3.0] {
            let candles = vec![Candle::new(d(2020, 1, 1), 1.0), Candle::new(d(2020, 1, 2), bad)];
            match ensure_positive_closes(&candles) {
                Err(crate::AnalogError::InvalidSeries(msg)) => assert!(msg.contains("candle 1"), "{}", msg),
                other => panic!("expected InvalidSeries for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_ensure_chronological_accepts_gaps() {
        let candles = vec![
            Candle::new(d(2020, 1, 3), 1.0),
            Candle::new(d(2020, 1, 6), 1.1),
        ];
        assert!(ensure_chronological(&candles).is_ok());
        assert!(ensure_chronological(&[]).is_ok());
    }

    #[test]
    fn test_match_with_aftermath_serializes_flat() {
        let m = MatchWithAftermath {
            matched: Match {
                start_index: 3,
                end_date: d(1999, 3, 1),
                similarity: 0.5,
                decade_bucket: "1990s".into(),
            },
            aftermath_returns: vec![0.01],
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["start_index"], 3);
        assert_eq!(json["decade_bucket"], "1990s");
    }
}
