use crate::domain::Candle;
use crate::error::{AnalogError, Result};
use chrono::{Duration, NaiveDate};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

/// Daily drift and volatility of the generated walk.
const DAILY_DRIFT: f64 = 0.0002;
const DAILY_VOL: f64 = 0.012;

/// Seeded geometric random walk of `n` consecutive calendar-day closes.
/// The same seed always yields the same series.
pub fn random_walk(n: usize, start_date: NaiveDate, start_price: f64, seed: u64) -> Result<Vec<Candle>> {
    if !(start_price.is_finite() && start_price > 0.0) {
        return Err(AnalogError::InvalidParameter(format!(
            "start price must be finite and positive, got {}",
            start_price
        )));
    }
    let shock = Normal::new(DAILY_DRIFT, DAILY_VOL)
        .map_err(|e| AnalogError::InvalidParameter(format!("walk distribution: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut price = start_price;
    Ok((0..n)
        .map(|i| {
            if i > 0 {
                price *= shock.sample(&mut rng).exp();
            }
            Candle::new(start_date + Duration::days(i as i64), price)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ensure_chronological;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
    }

    #[test]
    fn test_random_walk_deterministic() {
        let a = random_walk(500, start(), 100.0, 7).unwrap();
        let b = random_walk(500, start(), 100.0, 7).unwrap();
        assert_eq!(a, b);
        let c = random_walk(500, start(), 100.0, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_walk_shape() {
        let walk = random_walk(1000, start(), 50.0, 1).unwrap();
        assert_eq!(walk.len(), 1000);
        assert_eq!(walk[0].close, 50.0);
        assert!(walk.iter().all(|c| c.close > 0.0 && c.close.is_finite()));
        assert!(ensure_chronological(&walk).is_ok());
        assert_eq!(walk[999].date, start() + Duration::days(999));
    }

    #[test]
    fn test_random_walk_rejects_bad_start_price() {
        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                random_walk(10, start(), bad, 1),
                Err(AnalogError::InvalidParameter(_))
            ));
        }
    }
}
