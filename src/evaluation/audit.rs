use super::stats::{median, round_to, std_dev, DistributionStats};
use crate::config::{AuditConfig, Focus};
use crate::domain::{Candle, Match, NormalizedWindow};
use crate::engine::entropy::{
    histogram_probabilities, normalize_to_probabilities, normalized_shannon_entropy,
    shannon_entropy,
};
use crate::engine::scanner::{scan_candidates, select_top_k};
use crate::error::{AnalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Extra candles the audit demands beyond `window_size + focus_days`.
pub const AUDIT_HEADROOM: usize = 100;
/// Historical windows are sampled every this many start indices for the variance baseline.
pub const VARIANCE_SAMPLE_STRIDE: usize = 10;
pub const HISTOGRAM_BINS: usize = 20;

pub const LOW_VARIANCE_THRESHOLD: f64 = 0.3;
pub const SIMILARITY_CLUSTER_STD: f64 = 0.15;
pub const MIN_DISTINCT_DECADES: usize = 2;

/// Horizon pairs compared for top-K stability.
pub const STABILITY_PAIRS: [(Focus, Focus); 3] = [
    (Focus::D7, Focus::D30),
    (Focus::D30, Focus::D90),
    (Focus::D90, Focus::D365),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowVariance {
    pub current_variance: f64,
    pub median_historical_variance: f64,
    pub sampled_windows: usize,
    /// `min(1, current / median)`, or 0 without a usable baseline.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonScan {
    pub focus: Focus,
    pub candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonOverlap {
    pub a: Focus,
    pub b: Focus,
    /// `|A ∩ B| / max(|A|, 1)` over top-K start indices.
    pub overlap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyMetrics {
    /// Shannon entropy (bits) of the top-K similarities normalized to sum to 1.
    pub top_k_entropy: f64,
    pub top_k_entropy_normalized: f64,
    /// Shannon entropy (bits) of a 20-bin histogram of all similarities.
    pub distribution_entropy: f64,
    pub distribution_entropy_normalized: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticFlags {
    pub low_variance_warning: bool,
    pub similarity_cluster_warning: bool,
    pub insufficient_decade_spread: bool,
}

/// Statistical health of a retrieval over the whole candidate pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub focus: Focus,
    pub window_size: usize,
    pub top_k: usize,
    pub total_candles: usize,
    pub scan_candidates: usize,
    pub similarity_distribution: DistributionStats,
    pub window_variance: WindowVariance,
    pub decade_coverage: BTreeMap<String, usize>,
    pub top_k_decade_spread: BTreeMap<String, usize>,
    pub distinct_top_k_decades: usize,
    pub horizon_scans: Vec<HorizonScan>,
    pub horizon_stability: Vec<HorizonOverlap>,
    pub entropy: EntropyMetrics,
    pub top_matches: Vec<Match>,
    pub flags: DiagnosticFlags,
}

/// Runs the scanner independently of the forecast path and grades the result.
#[derive(Debug, Clone)]
pub struct DiagnosticAuditor {
    config: AuditConfig,
}

impl DiagnosticAuditor {
    pub fn new(config: AuditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn run_diagnostic_audit(&self, candles: &[Candle]) -> Result<AuditReport> {
        let window_size = self.config.window_size;
        let focus_days = self.config.focus.days();
        let top_k = self.config.top_k;

        let n = candles.len();
        let required = window_size + focus_days + AUDIT_HEADROOM;
        if n < required {
            return Err(AnalogError::InsufficientData {
                actual: n,
                required,
            });
        }

        let scanned = scan_or_empty(candles, window_size, focus_days)?;
        let similarities: Vec<f64> = scanned.iter().map(|m| m.similarity).collect();
        let distribution = DistributionStats::from_values(&similarities);
        let similarity_std = std_dev(&similarities);

        let variance = window_variance(candles, window_size);

        let top = select_top_k(&scanned, top_k);
        let decade_coverage = count_decades(&scanned);
        let top_k_decade_spread = count_decades(&top);
        let distinct_top_k_decades = top_k_decade_spread.len();

        let mut horizon_scans = Vec::with_capacity(Focus::ALL.len());
        let mut top_sets: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for focus in Focus::ALL {
            let horizon = scan_or_empty(candles, window_size, focus.days())?;
            let set = select_top_k(&horizon, top_k)
                .iter()
                .map(|m| m.start_index)
                .collect();
            horizon_scans.push(HorizonScan {
                focus,
                candidates: horizon.len(),
            });
            top_sets.insert(focus.days(), set);
        }
        let empty = BTreeSet::new();
        let horizon_stability = STABILITY_PAIRS
            .iter()
            .map(|&(a, b)| {
                let set_a = top_sets.get(&a.days()).unwrap_or(&empty);
                let set_b = top_sets.get(&b.days()).unwrap_or(&empty);
                HorizonOverlap {
                    a,
                    b,
                    overlap: round_to(overlap_ratio(set_a, set_b), 2),
                }
            })
            .collect();

        let top_sims: Vec<f64> = top.iter().map(|m| m.similarity).collect();
        let top_probs = normalize_to_probabilities(&top_sims);
        let hist = histogram_probabilities(&similarities, HISTOGRAM_BINS);
        let entropy = EntropyMetrics {
            top_k_entropy: round_to(shannon_entropy(&top_probs), 4),
            top_k_entropy_normalized: round_to(normalized_shannon_entropy(&top_probs), 4),
            distribution_entropy: round_to(shannon_entropy(&hist), 4),
            distribution_entropy_normalized: round_to(normalized_shannon_entropy(&hist), 4),
        };

        let flags = DiagnosticFlags {
            low_variance_warning: variance.score < LOW_VARIANCE_THRESHOLD,
            similarity_cluster_warning: similarity_std < SIMILARITY_CLUSTER_STD,
            insufficient_decade_spread: distinct_top_k_decades < MIN_DISTINCT_DECADES,
        };

        if flags.low_variance_warning
            || flags.similarity_cluster_warning
            || flags.insufficient_decade_spread
        {
            tracing::debug!(?flags, candidates = scanned.len(), "audit raised quality warnings");
        }

        Ok(AuditReport {
            focus: self.config.focus,
            window_size,
            top_k,
            total_candles: n,
            scan_candidates: scanned.len(),
            similarity_distribution: distribution.rounded(4),
            window_variance: WindowVariance {
                current_variance: round_to(variance.current_variance, 4),
                median_historical_variance: round_to(variance.median_historical_variance, 4),
                sampled_windows: variance.sampled_windows,
                score: round_to(variance.score, 2),
            },
            decade_coverage,
            top_k_decade_spread,
            distinct_top_k_decades,
            horizon_scans,
            horizon_stability,
            entropy,
            top_matches: top
                .into_iter()
                .map(|m| Match {
                    similarity: round_to(m.similarity, 4),
                    ..m
                })
                .collect(),
            flags,
        })
    }
}

/// The audit reports a scan it cannot run as zero candidates.
fn scan_or_empty(candles: &[Candle], window_len: usize, focus_len: usize) -> Result<Vec<Match>> {
    match scan_candidates(candles, window_len, focus_len) {
        Ok(matches) => Ok(matches),
        Err(AnalogError::InsufficientData { .. }) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn count_decades(matches: &[Match]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for m in matches {
        *counts.entry(m.decade_bucket.clone()).or_insert(0) += 1;
    }
    counts
}

/// `|A ∩ B| / max(|A|, 1)`.
pub fn overlap_ratio(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> f64 {
    a.intersection(b).count() as f64 / a.len().max(1) as f64
}

/// Variance of the normalized current window against the median variance of
/// historical windows sampled every `VARIANCE_SAMPLE_STRIDE` starts.
pub fn window_variance(candles: &[Candle], window_size: usize) -> WindowVariance {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    if window_size == 0 || closes.len() < window_size {
        return WindowVariance {
            current_variance: 0.0,
            median_historical_variance: 0.0,
            sampled_windows: 0,
            score: 0.0,
        };
    }
    let current_start = closes.len() - window_size;
    let current_variance = NormalizedWindow::from_closes(&closes[current_start..]).variance();

    // Historical windows end before the current window starts.
    let sampled: Vec<f64> = (0..current_start.saturating_sub(window_size) + 1)
        .step_by(VARIANCE_SAMPLE_STRIDE)
        .filter(|&i| i + window_size <= current_start)
        .map(|i| NormalizedWindow::from_closes(&closes[i..i + window_size]).variance())
        .collect();

    let median_var = if sampled.is_empty() { 0.0 } else { median(&sampled) };
    let score = if median_var > 0.0 {
        (current_variance / median_var).min(1.0)
    } else {
        0.0
    };

    WindowVariance {
        current_variance,
        median_historical_variance: median_var,
        sampled_windows: sampled.len(),
        score,
    }
}
