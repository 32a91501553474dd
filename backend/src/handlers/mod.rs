//! HTTP handlers for the AgroApp prediction server

pub mod catalog;
pub mod health;
pub mod prediction;

pub use catalog::get_catalog;
pub use health::health_check;
pub use prediction::{get_model_summary, predict_batch, predict_single, upload_batch};
