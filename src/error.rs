use thiserror::Error;

/// Error type for analog retrieval, forecasting and auditing
#[derive(Error, Debug)]
pub enum AnalogError {
    // Core preconditions
    #[error("Insufficient data: have {actual} candles, need at least {required}")]
    InsufficientData { actual: usize, required: usize },

    #[error("No matches found: scan produced zero candidates after applying min gap {min_gap}")]
    NoMatchesFound { min_gap: usize },

    // Boundary validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid candle series: {0}")]
    InvalidSeries(String),

    // Adapters
    #[error("Market data API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalogError>;
