//! Domain models for the water requirement prediction pipeline

mod encoder;
mod prediction;
mod record;
mod regressor;
mod scaler;

pub use encoder::*;
pub use prediction::*;
pub use record::*;
pub use regressor::*;
pub use scaler::*;
