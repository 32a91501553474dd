//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppState, ArtifactState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub artifacts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_error: Option<String>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Prediction routes answer 503 while artifacts are unavailable
    let (status, artifacts, artifact_error) = match &state.artifacts {
        ArtifactState::Ready(_) => ("healthy", "loaded", None),
        ArtifactState::Unavailable(reason) => ("degraded", "unavailable", Some(reason.to_string())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        artifacts: artifacts.to_string(),
        artifact_error,
    })
}
