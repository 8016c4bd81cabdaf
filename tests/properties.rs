use analog_forecast::domain::{similarity, Match, MatchWithAftermath, NormalizedWindow};
use analog_forecast::engine::{
    aggregate_bands, build_path, dispersion_entropy, replay_weight, NEUTRAL_ENTROPY,
};
use chrono::NaiveDate;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

fn finite(vals: &[f64]) -> Vec<f64> {
    vals.iter().copied().filter(|v| v.is_finite() && v.abs() < 1e9).collect()
}

#[quickcheck]
fn normalized_values_in_unit_range(raw: Vec<f64>) -> TestResult {
    let vals = finite(&raw);
    if vals.is_empty() {
        return TestResult::discard();
    }
    let w = NormalizedWindow::from_closes(&vals);
    TestResult::from_bool(w.len() == vals.len() && w.values().iter().all(|v| (0.0..=1.0).contains(v)))
}

#[quickcheck]
fn constant_slice_normalizes_to_half(value: f64, len: u8) -> TestResult {
    if !value.is_finite() || len == 0 {
        return TestResult::discard();
    }
    let w = NormalizedWindow::from_closes(&vec![value; len as usize]);
    TestResult::from_bool(w.values().iter().all(|&v| v == 0.5))
}

#[quickcheck]
fn similarity_symmetric_and_bounded(pairs: Vec<(f64, f64)>) -> TestResult {
    let (a, b): (Vec<f64>, Vec<f64>) = pairs
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite() && x.abs() < 1e9 && y.abs() < 1e9)
        .unzip();
    if a.is_empty() {
        return TestResult::discard();
    }
    let wa = NormalizedWindow::from_closes(&a);
    let wb = NormalizedWindow::from_closes(&b);
    let ab = wa.similarity(&wb);
    let ba = wb.similarity(&wa);
    TestResult::from_bool(ab == ba && (0.0..=1.0).contains(&ab))
}

#[quickcheck]
fn self_similarity_is_one(raw: Vec<f64>) -> TestResult {
    let vals = finite(&raw);
    let w = NormalizedWindow::from_closes(&vals);
    if w.len() < 2 || w.variance() == 0.0 {
        return TestResult::discard();
    }
    TestResult::from_bool((similarity(w.values(), w.values()) - 1.0).abs() < 1e-9)
}

#[quickcheck]
fn bands_always_ordered(paths: Vec<Vec<f64>>, steps: u8) -> TestResult {
    if paths.is_empty() {
        return TestResult::discard();
    }
    let focus_len = (steps % 40) as usize + 1;
    let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let analogs: Vec<MatchWithAftermath> = paths
        .into_iter()
        .enumerate()
        .map(|(i, returns)| MatchWithAftermath {
            matched: Match {
                start_index: i,
                end_date: date,
                similarity: 0.5,
                decade_bucket: "2000s".into(),
            },
            aftermath_returns: returns,
        })
        .collect();
    let out = aggregate_bands(&analogs, focus_len);
    TestResult::from_bool(out.bands.len() == focus_len && out.bands.is_ordered())
}

#[quickcheck]
fn replay_weight_bounded(similarity: f64, entropy: f64) -> bool {
    let w = replay_weight(similarity, entropy);
    (0.0..=0.5).contains(&w)
}

#[quickcheck]
fn dispersion_entropy_bounded(sims: Vec<f64>) -> bool {
    let e = dispersion_entropy(&sims);
    if sims.len() < 2 {
        return e == NEUTRAL_ENTROPY;
    }
    (0.0..=1.0).contains(&e)
}

#[quickcheck]
fn path_recovers_returns(base: f64, raw: Vec<f64>) -> TestResult {
    if !base.is_finite() || base.abs() < 1e-3 || base.abs() > 1e9 {
        return TestResult::discard();
    }
    let pct: Vec<f64> = raw.into_iter().filter(|p| p.is_finite() && p.abs() < 100.0).collect();
    let anchor = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let ok = build_path(base, anchor, &pct)
        .iter()
        .zip(&pct)
        .all(|(pt, p)| (pt.price / base - 1.0 - p).abs() < 1e-4);
    TestResult::from_bool(ok)
}
