pub mod audit;
pub mod stats;

pub use audit::*;
pub use stats::*;
