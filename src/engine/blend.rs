/// Upper bound on the replay share of the hybrid path.
pub const MAX_REPLAY_WEIGHT: f64 = 0.5;

/// Weight given to a single replayed analog: `clamp(similarity * (1 - entropy), 0, 0.5)`.
pub fn replay_weight(similarity: f64, entropy: f64) -> f64 {
    let w = similarity * (1.0 - entropy);
    if w.is_nan() {
        return 0.0;
    }
    w.clamp(0.0, MAX_REPLAY_WEIGHT)
}

/// Blend the ensemble median path with one analog's raw path.
/// Missing or non-finite replay steps count as 0.
pub fn blend_hybrid(synthetic: &[f64], replay: &[f64], weight: f64) -> Vec<f64> {
    synthetic
        .iter()
        .enumerate()
        .map(|(t, s)| {
            let r = replay.get(t).copied().filter(|v| v.is_finite()).unwrap_or(0.0);
            (1.0 - weight) * s + weight * r
        })
        .collect()
}
