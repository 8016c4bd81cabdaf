use crate::domain::{MatchWithAftermath, PercentileBands};
use crate::evaluation::stats::{percentile_sorted, sorted_copy};

/// Percentile bands plus the number of steps whose ordering had to be repaired.
#[derive(Debug, Clone, Default)]
pub struct BandsOutcome {
    pub bands: PercentileBands,
    pub repaired_steps: usize,
}

/// Build p10/p50/p90/mean per horizon step across the aftermath paths.
///
/// Non-finite samples are skipped; a step with no finite samples uses `[0]`.
pub fn aggregate_bands(paths: &[MatchWithAftermath], focus_len: usize) -> BandsOutcome {
    let mut bands = PercentileBands {
        p10: Vec::with_capacity(focus_len),
        p50: Vec::with_capacity(focus_len),
        p90: Vec::with_capacity(focus_len),
        mean: Vec::with_capacity(focus_len),
    };

    for t in 0..focus_len {
        let mut vals: Vec<f64> = paths
            .iter()
            .filter_map(|p| p.aftermath_returns.get(t).copied())
            .filter(|v| v.is_finite())
            .collect();
        if vals.is_empty() {
            vals.push(0.0);
        }
        let mean = vals.iter().sum::<f64>() / vals.len() as f64;
        let sorted = sorted_copy(&vals);
        bands.p10.push(percentile_sorted(&sorted, 0.10));
        bands.p50.push(percentile_sorted(&sorted, 0.50));
        bands.p90.push(percentile_sorted(&sorted, 0.90));
        bands.mean.push(mean);
    }

    let repaired_steps = repair_band_order(&mut bands);
    BandsOutcome {
        bands,
        repaired_steps,
    }
}

/// Force `p10 <= p50 <= p90` at every step by sorting any out-of-order triple.
/// Each repair is reported as a warning event; returns the number of repairs.
pub fn repair_band_order(bands: &mut PercentileBands) -> usize {
    let mut repaired = 0;
    for t in 0..bands.len() {
        let (lo, mid, hi) = (bands.p10[t], bands.p50[t], bands.p90[t]);
        if lo <= mid && mid <= hi {
            continue;
        }
        let mut triple = [lo, mid, hi];
        triple.sort_by(|a, b| a.total_cmp(b));
        bands.p10[t] = triple[0];
        bands.p50[t] = triple[1];
        bands.p90[t] = triple[2];
        repaired += 1;
        tracing::warn!(
            step = t,
            p10 = lo,
            p50 = mid,
            p90 = hi,
            "percentile band out of order, repaired by sorting"
        );
    }
    repaired
}
