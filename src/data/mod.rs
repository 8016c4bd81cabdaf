pub mod cache;
pub mod fetcher;
pub mod store;
pub mod synthetic;

pub use cache::*;
pub use fetcher::*;
pub use store::*;
pub use synthetic::*;
