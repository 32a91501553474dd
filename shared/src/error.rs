//! Error types for the prediction pipeline and artifact loading

use std::path::PathBuf;

use thiserror::Error;

/// Per-request pipeline failures. None of these are fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unknown {field} category: '{label}'")]
    UnknownCategory { field: &'static str, label: String },

    #[error("Code {code} is outside the {field} vocabulary (0..{classes})")]
    UnknownCode {
        field: &'static str,
        code: i64,
        classes: usize,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot compute metrics on an empty input")]
    EmptyInput,

    #[error("Length mismatch: {expected} expected values, {found} predicted values")]
    LengthMismatch { expected: usize, found: usize },
}

impl PipelineError {
    /// Name of the offending field, when the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            PipelineError::MissingField { field } | PipelineError::InvalidValue { field, .. } => {
                Some(field)
            }
            PipelineError::UnknownCategory { field, .. }
            | PipelineError::UnknownCode { field, .. } => Some(field),
            PipelineError::EmptyInput | PipelineError::LengthMismatch { .. } => None,
        }
    }
}

/// Failures while reading or validating one of the startup artifacts
#[derive(Error, Debug)]
pub enum ArtifactLoadError {
    #[error("Cannot read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
}

impl ArtifactLoadError {
    pub fn invalid(artifact: &'static str, reason: impl Into<String>) -> Self {
        ArtifactLoadError::Invalid {
            artifact,
            reason: reason.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// A pipeline failure inside a batch, tagged with the zero-based record index
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Record {index}: {source}")]
pub struct RecordError {
    pub index: usize,
    #[source]
    pub source: PipelineError,
}
