//! Error handling for the AgroApp prediction server
//!
//! Provides consistent error responses in English and French

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{PipelineError, RecordError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Pipeline errors
    #[error("{source}")]
    Pipeline {
        #[source]
        source: PipelineError,
        /// Zero-based record index within a batch
        record: Option<usize>,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Invalid batch file: {0}")]
    InvalidBatch(String),

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Batch has {count} records, limit is {limit}")]
    BatchTooLarge { count: usize, limit: usize },

    // Artifact errors
    #[error("Prediction artifacts unavailable: {0}")]
    ArtifactsUnavailable(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(source: PipelineError) -> Self {
        AppError::Pipeline {
            source,
            record: None,
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        AppError::Pipeline {
            source: err.source,
            record: Some(err.index),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: format!("Invalid form input: {}", errors),
            message_fr: format!("Saisie invalide pour le champ {}", field),
            field,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
}

fn pipeline_detail(err: &PipelineError, record: Option<usize>) -> (StatusCode, ErrorDetail) {
    let (status, code, message_fr) = match err {
        PipelineError::MissingField { field } => (
            StatusCode::BAD_REQUEST,
            "MISSING_FIELD",
            format!("Champ obligatoire manquant : {}", field),
        ),
        PipelineError::UnknownCategory { field, label } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNKNOWN_CATEGORY",
            format!("Valeur inconnue pour {} : '{}'", field, label),
        ),
        PipelineError::UnknownCode {
            field,
            code,
            classes,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNKNOWN_CODE",
            format!(
                "Le code {} est hors du vocabulaire de {} (0..{})",
                code, field, classes
            ),
        ),
        PipelineError::InvalidValue { field, reason } => (
            StatusCode::BAD_REQUEST,
            "INVALID_VALUE",
            format!("Valeur invalide pour {} : {}", field, reason),
        ),
        PipelineError::EmptyInput => (
            StatusCode::BAD_REQUEST,
            "EMPTY_INPUT",
            "Aucune donnée à traiter".to_string(),
        ),
        PipelineError::LengthMismatch { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "LENGTH_MISMATCH",
            "Nombre de prédictions incohérent".to_string(),
        ),
    };

    (
        status,
        ErrorDetail {
            code: code.to_string(),
            message_en: err.to_string(),
            message_fr,
            field: err.field().map(str::to_string),
            record,
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Pipeline { source, record } => pipeline_detail(source, *record),
            AppError::Validation {
                field,
                message,
                message_fr,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_fr: message_fr.clone(),
                    field: Some(field.clone()),
                    record: None,
                },
            ),
            AppError::InvalidForm(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_FORM".to_string(),
                    message_en: format!("Invalid form: {}", msg),
                    message_fr: format!("Formulaire invalide : {}", msg),
                    field: None,
                    record: None,
                },
            ),
            AppError::InvalidBatch(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_BATCH".to_string(),
                    message_en: format!("Invalid batch file: {}", msg),
                    message_fr: format!("Fichier invalide : {}", msg),
                    field: None,
                    record: None,
                },
            ),
            AppError::EmptyBatch => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "EMPTY_BATCH".to_string(),
                    message_en: "The batch contains no records".to_string(),
                    message_fr: "Le fichier ne contient aucun enregistrement".to_string(),
                    field: None,
                    record: None,
                },
            ),
            AppError::BatchTooLarge { count, limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorDetail {
                    code: "BATCH_TOO_LARGE".to_string(),
                    message_en: format!("Batch has {} records, limit is {}", count, limit),
                    message_fr: format!(
                        "Le fichier contient {} enregistrements, la limite est {}",
                        count, limit
                    ),
                    field: None,
                    record: None,
                },
            ),
            AppError::ArtifactsUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "ARTIFACTS_UNAVAILABLE".to_string(),
                    message_en: format!("Prediction model is not available: {}", msg),
                    message_fr: "Le modèle de prédiction n'est pas disponible".to_string(),
                    field: None,
                    record: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_fr: "Erreur interne du serveur".to_string(),
                    field: None,
                    record: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_fr: "Erreur interne du serveur".to_string(),
                    field: None,
                    record: None,
                },
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
