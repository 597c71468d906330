mod config;
mod measure;
mod outcome;

pub use config::*;
pub use measure::*;
pub use outcome::*;
