//! HTTP handlers for water requirement predictions

use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::ArtifactSummary;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::services::prediction::{BatchPrediction, PredictionService, SinglePrediction};
use crate::AppState;

/// Name of the multipart field carrying the uploaded file
const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize, Validate)]
pub struct BatchQuery {
    #[validate(custom = "validate_format")]
    pub format: Option<String>, // "json" or "csv"
}

fn validate_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "json" | "csv" => Ok(()),
        _ => Err(ValidationError::new("unsupported_format")),
    }
}

/// Predict the water requirement of a single form submission
pub async fn predict_single(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<SinglePrediction>> {
    let service = state.prediction_service()?;
    let form = PredictionService::parse_form(&body)?;
    let prediction = service.predict_form(form)?;
    Ok(Json(prediction))
}

/// Predict a batch sent as a JSON array body
pub async fn predict_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    body: Bytes,
) -> AppResult<Response> {
    query.validate()?;
    let service = state.prediction_service()?;
    let records = PredictionService::parse_batch(&body)?;
    let batch = service.predict_batch(records)?;
    render_batch(batch, query.format.as_deref())
}

/// Predict a batch uploaded as a JSON file
pub async fn upload_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    query.validate()?;
    let service = state.prediction_service()?;

    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidBatch(e.to_string()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            tracing::debug!(filename = ?field.file_name(), "Receiving batch upload");
            payload = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidBatch(e.to_string()))?,
            );
            break;
        }
    }

    let bytes = payload.ok_or_else(|| {
        AppError::InvalidBatch(format!("missing multipart field '{}'", UPLOAD_FIELD))
    })?;
    let records = PredictionService::parse_batch(&bytes)?;
    let batch = service.predict_batch(records)?;
    render_batch(batch, query.format.as_deref())
}

/// Describe the loaded model, scaler and encoder vocabularies
pub async fn get_model_summary(State(state): State<AppState>) -> AppResult<Json<ArtifactSummary>> {
    let artifacts = state.artifacts()?;
    Ok(Json(artifacts.summary()))
}

fn render_batch(batch: BatchPrediction, format: Option<&str>) -> AppResult<Response> {
    if format == Some("csv") {
        let csv = PredictionService::export_to_csv(&batch.records)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"predictions.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(batch).into_response())
    }
}
