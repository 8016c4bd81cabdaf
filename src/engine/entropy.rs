use crate::evaluation::stats::{mean, std_dev};

/// Dispersion entropy returned when there are too few similarities to measure spread.
pub const NEUTRAL_ENTROPY: f64 = 0.25;

/// Coefficient of variation of the similarity scores, clamped to [0, 1].
/// Fewer than two inputs give [`NEUTRAL_ENTROPY`].
pub fn dispersion_entropy(similarities: &[f64]) -> f64 {
    if similarities.len() < 2 {
        return NEUTRAL_ENTROPY;
    }
    let m = mean(similarities).max(0.01);
    let e = std_dev(similarities) / m;
    if e.is_nan() {
        return NEUTRAL_ENTROPY;
    }
    e.clamp(0.0, 1.0)
}

/// Shannon entropy in bits of a probability vector. Zero entries contribute nothing.
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Shannon entropy divided by its maximum `log2(n)`; 0 when `n < 2`.
pub fn normalized_shannon_entropy(probs: &[f64]) -> f64 {
    if probs.len() < 2 {
        return 0.0;
    }
    shannon_entropy(probs) / (probs.len() as f64).log2()
}

/// Scale non-negative weights to sum to 1. A zero or non-finite total yields an empty vector.
pub fn normalize_to_probabilities(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }
    weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w / total } else { 0.0 })
        .collect()
}

/// Fraction of values in each of `bins` equal-width buckets over [0, 1].
/// Bucket = `min(floor(v * bins), bins - 1)`; non-finite values are skipped.
pub fn histogram_probabilities(values: &[f64], bins: usize) -> Vec<f64> {
    if bins == 0 {
        return Vec::new();
    }
    let mut counts = vec![0usize; bins];
    let mut total = 0usize;
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = ((v * bins as f64).floor().max(0.0) as usize).min(bins - 1);
        counts[idx] += 1;
        total += 1;
    }
    if total == 0 {
        return vec![0.0; bins];
    }
    counts.iter().map(|&c| c as f64 / total as f64).collect()
}
