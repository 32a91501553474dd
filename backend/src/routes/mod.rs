//! Route definitions for the AgroApp prediction server

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check with artifact status
        .route("/health", get(handlers::health_check))
        // Form options
        .route("/catalog", get(handlers::get_catalog))
        // Loaded model description
        .route("/model", get(handlers::get_model_summary))
        // Predictions
        .nest("/predictions", prediction_routes())
}

/// Prediction routes
fn prediction_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::predict_single))
        .route("/batch", post(handlers::predict_batch))
        .route("/upload", post(handlers::upload_batch))
}
