use crate::domain::PathPoint;
use chrono::{Duration, NaiveDate};

/// Turn fractional returns into dated absolute prices.
///
/// Step `t` (1-based) is dated `anchor_date + t` calendar days; weekends and
/// holidays are not skipped.
pub fn build_path(anchor_price: f64, anchor_date: NaiveDate, pct: &[f64]) -> Vec<PathPoint> {
    pct.iter()
        .enumerate()
        .map(|(i, &p)| {
            let t = i + 1;
            PathPoint {
                t,
                date: anchor_date + Duration::days(t as i64),
                price: anchor_price * (1.0 + p),
                pct_from_start: p,
            }
        })
        .collect()
}
