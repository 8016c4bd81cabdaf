pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod evaluation;

pub use config::{AuditConfig, Focus, ForecastConfig};
pub use error::{AnalogError, Result};
