use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return 0.0;
    }
    vals.iter().mean()
}

/// Population standard deviation; 0 for an empty slice.
pub fn std_dev(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return 0.0;
    }
    vals.iter().population_std_dev()
}

/// Percentile of an ascending-sorted slice by linear interpolation between the
/// order statistics around index `(len - 1) * p`. Empty input gives 0.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = idx - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Sort a copy ascending. NaNs are expected to be filtered by the caller.
pub fn sorted_copy(vals: &[f64]) -> Vec<f64> {
    let mut sorted = vals.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn median(vals: &[f64]) -> f64 {
    percentile_sorted(&sorted_copy(vals), 0.5)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Summary statistics of a similarity distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl DistributionStats {
    /// Describe `vals`. An empty input yields all-zero figures.
    pub fn from_values(vals: &[f64]) -> Self {
        if vals.is_empty() {
            return Self::default();
        }
        let sorted = sorted_copy(vals);
        let pct = |p: f64| percentile_sorted(&sorted, p);
        Self {
            count: vals.len(),
            mean: mean(vals),
            median: pct(0.5),
            std: std_dev(vals),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p10: pct(0.10),
            p25: pct(0.25),
            p50: pct(0.50),
            p75: pct(0.75),
            p90: pct(0.90),
            p95: pct(0.95),
            p99: pct(0.99),
        }
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        let r = |v: f64| round_to(v, decimals);
        Self {
            count: self.count,
            mean: r(self.mean),
            median: r(self.median),
            std: r(self.std),
            min: r(self.min),
            max: r(self.max),
            p10: r(self.p10),
            p25: r(self.p25),
            p50: r(self.p50),
            p75: r(self.p75),
            p90: r(self.p90),
            p95: r(self.p95),
            p99: r(self.p99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile_sorted(&sorted, 0.5) - 3.0).abs() < 1e-12);
        // idx = 4 * 0.1 = 0.4 -> 1 + 0.4
        assert!((percentile_sorted(&sorted, 0.1) - 1.4).abs() < 1e-12);
        assert!((percentile_sorted(&sorted, 0.9) - 4.6).abs() < 1e-12);
        assert_eq!(percentile_sorted(&sorted, 1.0), 5.0);
    }

    #[test]
    fn test_percentile_single_and_empty() {
        assert_eq!(percentile_sorted(&[7.0], 0.9), 7.0);
        assert_eq!(percentile_sorted(&[], 0.5), 0.0);
    }

    #[test]
    fn test_median_even() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_population() {
        // Population std of [2,4,4,4,5,5,7,9] is exactly 2.
        let vals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&vals) - 2.0).abs() < 1e-12);
        assert!((mean(&vals) - 5.0).abs() < 1e-12);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-0.98765, 2), -0.99);
        assert_eq!(round_to(3.0, 4), 3.0);
    }

    #[test]
    fn test_distribution_stats() {
        let vals: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        let s = DistributionStats::from_values(&vals);
        assert_eq!(s.count, 101);
        assert!((s.median - 0.5).abs() < 1e-12);
        assert!((s.p99 - 0.99).abs() < 1e-12);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 1.0);
    }

    #[test]
    fn test_distribution_stats_empty() {
        let s = DistributionStats::from_values(&[]);
        assert_eq!(s, DistributionStats::default());
    }
}
