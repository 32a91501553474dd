//! Loader for the trained model artifacts
//!
//! The model, scaler and encoders are produced by the training workflow
//! and exported as JSON. They are read once at startup.

use std::path::Path;

use serde::de::DeserializeOwned;
use shared::{
    ArtifactLoadError, CategoricalField, EncoderSpec, FeatureScaler, GradientBoostingRegressor,
    GradientBoostingSpec, LabelEncoder, PipelineArtifacts,
};

use crate::config::ArtifactsConfig;

/// Reads artifact files from the configured directory
#[derive(Clone)]
pub struct ArtifactLoader {
    config: ArtifactsConfig,
}

impl ArtifactLoader {
    pub fn new(config: ArtifactsConfig) -> Self {
        Self { config }
    }

    /// Load and cross-check all five artifact files
    pub fn load(&self) -> Result<PipelineArtifacts, ArtifactLoadError> {
        tracing::info!("Loading prediction artifacts from {}", self.config.dir.display());

        let model_spec: GradientBoostingSpec = read_json(&self.config.model_path())?;
        let model = GradientBoostingRegressor::from_spec(&model_spec)?;
        tracing::info!(
            trees = model.n_estimators(),
            learning_rate = model.learning_rate(),
            "Model loaded"
        );

        let scaler: FeatureScaler = read_json(&self.config.scaler_path())?;
        tracing::info!(kind = scaler.kind(), "Scaler loaded");

        let plant = self.load_encoder(CategoricalField::Plant, &self.config.plant_encoder_path())?;
        let soil_type =
            self.load_encoder(CategoricalField::SoilType, &self.config.soil_encoder_path())?;
        let season =
            self.load_encoder(CategoricalField::Season, &self.config.season_encoder_path())?;

        PipelineArtifacts::new(Box::new(model), scaler, plant, soil_type, season)
    }

    fn load_encoder(
        &self,
        field: CategoricalField,
        path: &Path,
    ) -> Result<LabelEncoder, ArtifactLoadError> {
        let spec: EncoderSpec = read_json(path)?;
        let encoder = LabelEncoder::from_spec(field, spec)?;
        tracing::info!(field = %field, classes = encoder.len(), "Encoder loaded");
        Ok(encoder)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
