use crate::domain::{decade_bucket, Candle, Match, MatchWithAftermath, NormalizedWindow};
use crate::error::{AnalogError, Result};

// ── Leakage guard ──────────────────────────────────────────────────────────────

/// Floor on the separation between a candidate's end and the current window's start.
pub const MIN_GAP_FLOOR: usize = 120;

/// Minimum index separation between a candidate window's end and the current
/// window's start: `max(2 * focus_len, 120)`.
pub fn min_gap(focus_len: usize) -> usize {
    (focus_len * 2).max(MIN_GAP_FLOOR)
}

/// Candle count below which a scan cannot proceed.
pub fn required_candles(window_len: usize, focus_len: usize) -> usize {
    window_len + focus_len + min_gap(focus_len)
}

/// Exclusive upper bound on valid candidate start indices, i.e. every `i` below
/// it satisfies `i + window_len - 1 < current_start - min_gap`.
fn candidate_end(n: usize, window_len: usize, focus_len: usize) -> usize {
    let current_start = n.saturating_sub(window_len);
    (current_start + 1).saturating_sub(min_gap(focus_len) + window_len)
}

// ── Scan ───────────────────────────────────────────────────────────────────────

/// Score every leakage-safe historical window against the last `window_len` candles.
///
/// Results are in start-index (chronological) order. Fails with
/// `InsufficientData` when `candles.len() < window_len + focus_len + min_gap`;
/// a count that passes may still produce an empty scan.
pub fn scan_candidates(candles: &[Candle], window_len: usize, focus_len: usize) -> Result<Vec<Match>> {
    let n = candles.len();
    let required = required_candles(window_len, focus_len);
    if n < required || window_len == 0 {
        return Err(AnalogError::InsufficientData { actual: n, required });
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let current_start = n - window_len;
    let current = NormalizedWindow::from_closes(&closes[current_start..]);

    let end = candidate_end(n, window_len, focus_len);
    let mut matches = Vec::with_capacity(end);
    for i in 0..end {
        let candidate = NormalizedWindow::from_closes(&closes[i..i + window_len]);
        let end_date = candles[i + window_len - 1].date;
        matches.push(Match {
            start_index: i,
            end_date,
            similarity: current.similarity(&candidate),
            decade_bucket: decade_bucket(end_date),
        });
    }

    Ok(matches)
}

// ── Selection & aftermath ──────────────────────────────────────────────────────

/// Top `k` matches by similarity, descending. Ties keep scan order (stable sort).
pub fn select_top_k(matches: &[Match], k: usize) -> Vec<Match> {
    let mut ranked = matches.to_vec();
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(k);
    ranked
}

/// Returns of the `focus_len` closes after a match window, relative to the
/// window's last close. `None` if the history is too short.
pub fn extract_aftermath(
    candles: &[Candle],
    matched: &Match,
    window_len: usize,
    focus_len: usize,
) -> Option<MatchWithAftermath> {
    let after_start = matched.start_index + window_len;
    let after_end = after_start + focus_len;
    if after_end > candles.len() {
        return None;
    }
    let base = candles[after_start - 1].close;
    let aftermath_returns = candles[after_start..after_end]
        .iter()
        .map(|c| c.close / base - 1.0)
        .collect();
    Some(MatchWithAftermath {
        matched: matched.clone(),
        aftermath_returns,
    })
}

/// Attach aftermaths to each selected match, dropping any without a full horizon.
pub fn with_aftermath(
    candles: &[Candle],
    selected: &[Match],
    window_len: usize,
    focus_len: usize,
) -> Vec<MatchWithAftermath> {
    selected
        .iter()
        .filter_map(|m| extract_aftermath(candles, m, window_len, focus_len))
        .collect()
}
