pub mod bands;
pub mod blend;
pub mod entropy;
pub mod forecast;
pub mod path;
pub mod scanner;

pub use bands::*;
pub use blend::*;
pub use entropy::*;
pub use forecast::*;
pub use path::*;
pub use scanner::*;
