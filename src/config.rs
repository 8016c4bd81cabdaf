use crate::error::{AnalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Forecast horizon key. Maps the `"7d" | "30d" | ...` request keys to day counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    #[serde(rename = "7d")]
    D7,
    #[default]
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "90d")]
    D90,
    #[serde(rename = "180d")]
    D180,
    #[serde(rename = "365d")]
    D365,
}

impl Focus {
    /// Every horizon, shortest first. The audit scans all of them.
    pub const ALL: [Focus; 5] = [Focus::D7, Focus::D30, Focus::D90, Focus::D180, Focus::D365];

    pub fn days(self) -> usize {
        match self {
            Focus::D7 => 7,
            Focus::D30 => 30,
            Focus::D90 => 90,
            Focus::D180 => 180,
            Focus::D365 => 365,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Focus::D7 => "7d",
            Focus::D30 => "30d",
            Focus::D90 => "90d",
            Focus::D180 => "180d",
            Focus::D365 => "365d",
        }
    }
}

impl FromStr for Focus {
    type Err = AnalogError;

    fn from_str(s: &str) -> Result<Self> {
        Focus::ALL
            .into_iter()
            .find(|f| f.key() == s.trim())
            .ok_or_else(|| AnalogError::InvalidParameter(format!("unknown focus key: {:?}", s)))
    }
}

impl std::fmt::Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Parameters of `build_synthetic_forecast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub focus: Focus,
    /// Number of analogs feeding the percentile bands.
    pub top_k: usize,
    /// 1-based rank of the analog replayed into the hybrid path.
    pub rank: usize,
    pub window_len: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            focus: Focus::D30,
            top_k: 20,
            rank: 1,
            window_len: 120,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_len < 2 {
            return Err(AnalogError::InvalidParameter(format!(
                "window_len must be >= 2, got {}",
                self.window_len
            )));
        }
        if self.top_k == 0 {
            return Err(AnalogError::InvalidParameter("top_k must be >= 1".into()));
        }
        if self.rank == 0 || self.rank > self.top_k {
            return Err(AnalogError::InvalidParameter(format!(
                "rank must be in 1..={}, got {}",
                self.top_k, self.rank
            )));
        }
        Ok(())
    }

    pub fn focus_len(&self) -> usize {
        self.focus.days()
    }
}

/// Parameters of `run_diagnostic_audit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub focus: Focus,
    pub window_size: usize,
    pub top_k: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            focus: Focus::D30,
            window_size: 120,
            top_k: 50,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(AnalogError::InvalidParameter(format!(
                "window_size must be >= 2, got {}",
                self.window_size
            )));
        }
        if self.top_k == 0 {
            return Err(AnalogError::InvalidParameter("top_k must be >= 1".into()));
        }
        Ok(())
    }
}

/// Optional on-disk overrides for the CLI: `{"forecast": {...}, "audit": {...}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub forecast: ForecastConfig,
    pub audit: AuditConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
