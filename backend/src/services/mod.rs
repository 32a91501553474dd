//! Business logic services for the AgroApp prediction server

pub mod prediction;

pub use prediction::PredictionService;
