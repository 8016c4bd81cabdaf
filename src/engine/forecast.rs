use super::bands::aggregate_bands;
use super::blend::{blend_hybrid, replay_weight};
use super::entropy::dispersion_entropy;
use super::path::build_path;
use super::scanner::{min_gap, scan_candidates, select_top_k, with_aftermath};
use crate::config::{Focus, ForecastConfig};
use crate::domain::{Candle, Match, PathPoint, PercentileBands};
use crate::error::{AnalogError, Result};
use crate::evaluation::stats::round_to;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const OUTPUT_DECIMALS: i32 = 4;

/// p10/p50/p90 bands rendered as price paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandPaths {
    pub p10: Vec<PathPoint>,
    pub p50: Vec<PathPoint>,
    pub p90: Vec<PathPoint>,
}

/// How the hybrid path was weighted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Similarity of the replayed analog.
    pub similarity: f64,
    /// Dispersion entropy of the similarities feeding the ensemble.
    pub entropy: f64,
    pub replay_weight: f64,
    pub top_k: usize,
    /// 1-based rank of the replayed analog actually used.
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMeta {
    pub current_last_price: f64,
    pub current_window_end: NaiveDate,
    pub now_timestamp: DateTime<Utc>,
    pub focus: Focus,
    pub window_len: usize,
    pub min_gap: usize,
    pub scan_candidates: usize,
    /// Horizon steps whose p10/p50/p90 had to be re-sorted.
    pub band_repairs: usize,
}

/// Forecast output consumed by signal and dashboard components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPack {
    pub pct: PercentileBands,
    pub bands: BandPaths,
    /// The ensemble median (p50) path.
    pub synthetic: Vec<PathPoint>,
    pub hybrid: Vec<PathPoint>,
    pub weights: BlendWeights,
    /// Analogs behind the bands, best first.
    pub matches: Vec<Match>,
    pub meta: ForecastMeta,
}

/// Stateless analog forecaster. Holds only its validated parameters, so one
/// instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct AnalogEngine {
    config: ForecastConfig,
}

impl AnalogEngine {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn build_synthetic_forecast(&self, candles: &[Candle]) -> Result<ForecastPack> {
        self.build_synthetic_forecast_at(candles, Utc::now())
    }

    /// Same as [`build_synthetic_forecast`](Self::build_synthetic_forecast) with an explicit clock.
    pub fn build_synthetic_forecast_at(
        &self,
        candles: &[Candle],
        now: DateTime<Utc>,
    ) -> Result<ForecastPack> {
        let window_len = self.config.window_len;
        let focus_len = self.config.focus_len();
        let gap = min_gap(focus_len);

        let scanned = scan_candidates(candles, window_len, focus_len)?;
        let selected = select_top_k(&scanned, self.config.top_k);
        let analogs = with_aftermath(candles, &selected, window_len, focus_len);
        if analogs.is_empty() {
            return Err(AnalogError::NoMatchesFound { min_gap: gap });
        }

        let outcome = aggregate_bands(&analogs, focus_len);
        let bands = outcome.bands;

        let similarities: Vec<f64> = analogs.iter().map(|a| a.matched.similarity).collect();
        let entropy = dispersion_entropy(&similarities);

        let rank = self.config.rank.min(analogs.len());
        let replay = &analogs[rank - 1];
        let weight = replay_weight(replay.matched.similarity, entropy);
        let hybrid = blend_hybrid(&bands.p50, &replay.aftermath_returns, weight);

        // Scan succeeded, so the series is non-empty.
        let last = candles[candles.len() - 1];
        let anchor_price = last.close;
        let anchor_date = last.date;

        let pct = round_bands(&bands);
        let to_path = |series: &[f64]| round_path(build_path(anchor_price, anchor_date, series));
        let synthetic = to_path(&bands.p50);

        Ok(ForecastPack {
            bands: BandPaths {
                p10: to_path(&bands.p10),
                p50: synthetic.clone(),
                p90: to_path(&bands.p90),
            },
            synthetic,
            hybrid: to_path(&hybrid),
            weights: BlendWeights {
                similarity: round_to(replay.matched.similarity, OUTPUT_DECIMALS),
                entropy: round_to(entropy, OUTPUT_DECIMALS),
                replay_weight: round_to(weight, OUTPUT_DECIMALS),
                top_k: self.config.top_k,
                rank,
            },
            matches: analogs
                .iter()
                .map(|a| Match {
                    similarity: round_to(a.matched.similarity, OUTPUT_DECIMALS),
                    ..a.matched.clone()
                })
                .collect(),
            meta: ForecastMeta {
                current_last_price: round_to(anchor_price, OUTPUT_DECIMALS),
                current_window_end: anchor_date,
                now_timestamp: now,
                focus: self.config.focus,
                window_len,
                min_gap: gap,
                scan_candidates: scanned.len(),
                band_repairs: outcome.repaired_steps,
            },
            pct,
        })
    }
}

fn round_series(vals: &[f64]) -> Vec<f64> {
    vals.iter().map(|&v| round_to(v, OUTPUT_DECIMALS)).collect()
}

fn round_bands(bands: &PercentileBands) -> PercentileBands {
    PercentileBands {
        p10: round_series(&bands.p10),
        p50: round_series(&bands.p50),
        p90: round_series(&bands.p90),
        mean: round_series(&bands.mean),
    }
}

fn round_path(points: Vec<PathPoint>) -> Vec<PathPoint> {
    points
        .into_iter()
        .map(|p| PathPoint {
            price: round_to(p.price, OUTPUT_DECIMALS),
            pct_from_start: round_to(p.pct_from_start, OUTPUT_DECIMALS),
            ..p
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_candles(n: usize) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let x = i as f64;
                let close = 100.0 + (x * 0.05).sin() * 8.0 + (x * 0.011).cos() * 4.0 + x * 0.02;
                Candle::new(start + Duration::days(i as i64), close)
            })
            .collect()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn engine(top_k: usize, rank: usize) -> AnalogEngine {
        AnalogEngine::new(ForecastConfig {
            focus: Focus::D30,
            top_k,
            rank,
            window_len: 60,
        })
        .unwrap()
    }

    #[test]
    fn test_forecast_shapes() {
        let candles = make_candles(1500);
        let pack = engine(15, 1).build_synthetic_forecast_at(&candles, fixed_now()).unwrap();
        assert_eq!(pack.pct.len(), 30);
        assert_eq!(pack.synthetic.len(), 30);
        assert_eq!(pack.hybrid.len(), 30);
        assert_eq!(pack.bands.p10.len(), 30);
        assert_eq!(pack.matches.len(), 15);
        assert!(pack.pct.is_ordered());
        assert_eq!(pack.meta.current_window_end, candles[1499].date);
        assert_eq!(pack.synthetic[0].date, candles[1499].date + Duration::days(1));
        assert_eq!(pack.meta.now_timestamp, fixed_now());
        assert_eq!(pack.meta.min_gap, 120);
    }

    #[test]
    fn test_forecast_matches_ranked() {
        let candles = make_candles(1500);
        let pack = engine(10, 1).build_synthetic_forecast_at(&candles, fixed_now()).unwrap();
        for pair in pack.matches.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert_eq!(pack.weights.similarity, pack.matches[0].similarity);
        assert!(pack.weights.replay_weight <= 0.5 && pack.weights.replay_weight >= 0.0);
    }

    #[test]
    fn test_forecast_synthetic_equals_p50() {
        let candles = make_candles(1200);
        let pack = engine(8, 2).build_synthetic_forecast_at(&candles, fixed_now()).unwrap();
        for (pt, p50) in pack.synthetic.iter().zip(&pack.pct.p50) {
            assert_eq!(pt.pct_from_start, *p50);
        }
        assert_eq!(pack.weights.rank, 2);
    }

    #[test]
    fn test_forecast_insufficient_data() {
        let candles = make_candles(200);
        let err = engine(5, 1).build_synthetic_forecast_at(&candles, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            AnalogError::InsufficientData {
                actual: 200,
                required: 210
            }
        ));
    }

    #[test]
    fn test_forecast_no_matches() {
        // 60 + 30 + 120 = 210 passes the count check but leaves no start index.
        let candles = make_candles(210);
        let err = engine(5, 1).build_synthetic_forecast_at(&candles, fixed_now()).unwrap_err();
        assert!(matches!(err, AnalogError::NoMatchesFound { min_gap: 120 }));
    }

    #[test]
    fn test_forecast_rank_falls_back_to_last() {
        // Valid starts satisfy i + 59 < 182 - 120, so only i = 0, 1, 2 exist.
        let candles = make_candles(60 + 120 + 60 + 2);
        let pack = engine(10, 10).build_synthetic_forecast_at(&candles, fixed_now()).unwrap();
        assert_eq!(pack.matches.len(), 3);
        assert_eq!(pack.weights.rank, 3);
        assert_eq!(pack.weights.top_k, 10);
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let cfg = ForecastConfig {
            window_len: 1,
            ..Default::default()
        };
        assert!(AnalogEngine::new(cfg).is_err());
    }

    #[test]
    fn test_forecast_values_rounded() {
        let candles = make_candles(1200);
        let pack = engine(12, 1).build_synthetic_forecast_at(&candles, fixed_now()).unwrap();
        for p in pack.hybrid.iter().chain(pack.bands.p90.iter()) {
            assert_eq!(round_to(p.price, 4), p.price);
            assert_eq!(round_to(p.pct_from_start, 4), p.pct_from_start);
        }
    }
}
