//! Shared types and prediction logic for AgroApp
//!
//! This crate holds the irrigation water requirement pipeline: record
//! models, the trained artifacts it runs against, encoding, scaling,
//! inference and the batch metrics. It does no I/O; the backend loads the
//! artifacts and serves the pipeline over HTTP.

pub mod artifacts;
pub mod catalog;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod validation;

pub use artifacts::*;
pub use error::*;
pub use models::*;
pub use pipeline::PredictionPipeline;
pub use validation::*;
