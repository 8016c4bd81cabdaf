use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Min-max scaled window of closes. Values lie in [0, 1]; a flat source maps to 0.5.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWindow(Vec<f64>);

impl NormalizedWindow {
    /// Scale a slice of closes. An empty slice yields an empty window.
    pub fn from_closes(closes: &[f64]) -> Self {
        if closes.is_empty() {
            return Self(Vec::new());
        }
        let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range == 0.0 {
            return Self(vec![0.5; closes.len()]);
        }
        Self(closes.iter().map(|v| (v - min) / range).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Population variance of the scaled values; 0 when empty.
    pub fn variance(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().population_variance()
    }

    /// Shape similarity in [0, 1]; see [`similarity`].
    pub fn similarity(&self, other: &NormalizedWindow) -> f64 {
        similarity(&self.0, &other.0)
    }
}

/// Pearson correlation mapped from [-1, 1] onto [0, 1].
///
/// Empty or mismatched inputs score 0. If exactly one side has zero variance the
/// correlation is undefined and the score is 0; if both are flat and identical
/// (two flat normalized windows are both all 0.5) the shapes coincide and score 1.
/// A non-finite correlation (NaN or infinite inputs) scores 0.
pub fn similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut ss_a = 0.0;
    let mut ss_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        num += da * db;
        ss_a += da * da;
        ss_b += db * db;
    }

    let denom = (ss_a * ss_b).sqrt();
    if denom == 0.0 {
        if ss_a == 0.0 && ss_b == 0.0 && a == b {
            return 1.0;
        }
        return 0.0;
    }
    let corr = num / denom;
    if !corr.is_finite() {
        return 0.0;
    }
    ((corr + 1.0) / 2.0).clamp(0.0, 1.0)
}
