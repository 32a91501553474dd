//! The immutable set of trained artifacts the pipeline runs against

use std::fmt;

use serde::Serialize;

use crate::error::{ArtifactLoadError, PipelineResult};
use crate::models::{
    CategoricalField, FeatureScaler, LabelEncoder, ModelSummary, Regressor, FEATURE_COUNT,
    FEATURE_ORDER,
};

/// Model, scaler and the three encoders, loaded once at startup.
///
/// Construction validates that the pieces fit together; afterwards the
/// value is only ever read.
pub struct PipelineArtifacts {
    model: Box<dyn Regressor>,
    scaler: FeatureScaler,
    plant: LabelEncoder,
    soil_type: LabelEncoder,
    season: LabelEncoder,
}

impl PipelineArtifacts {
    pub fn new(
        model: Box<dyn Regressor>,
        scaler: FeatureScaler,
        plant: LabelEncoder,
        soil_type: LabelEncoder,
        season: LabelEncoder,
    ) -> Result<Self, ArtifactLoadError> {
        if model.n_features() != FEATURE_COUNT {
            return Err(ArtifactLoadError::invalid(
                "model",
                format!(
                    "model expects {} features, pipeline produces {}",
                    model.n_features(),
                    FEATURE_COUNT
                ),
            ));
        }

        scaler.validate()?;

        for (encoder, expected) in [
            (&plant, CategoricalField::Plant),
            (&soil_type, CategoricalField::SoilType),
            (&season, CategoricalField::Season),
        ] {
            if encoder.field() != expected {
                return Err(ArtifactLoadError::invalid(
                    "encoder",
                    format!(
                        "encoder for {} supplied in place of {}",
                        encoder.field(),
                        expected
                    ),
                ));
            }
        }

        Ok(Self {
            model,
            scaler,
            plant,
            soil_type,
            season,
        })
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    /// Encoder for a categorical column
    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        match field {
            CategoricalField::Plant => &self.plant,
            CategoricalField::SoilType => &self.soil_type,
            CategoricalField::Season => &self.season,
        }
    }

    /// Label of a code for display
    pub fn decode(&self, code: i64, field: CategoricalField) -> PipelineResult<&str> {
        self.encoder(field).decode(code)
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            model: self.model.describe(),
            scaler: self.scaler.kind(),
            feature_order: FEATURE_ORDER.to_vec(),
            plants: self.plant.classes().to_vec(),
            soil_types: self.soil_type.classes().to_vec(),
            seasons: self.season.classes().to_vec(),
        }
    }
}

impl fmt::Debug for PipelineArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineArtifacts")
            .field("model", &self.model.describe())
            .field("scaler", &self.scaler.kind())
            .field("plant_classes", &self.plant.len())
            .field("soil_type_classes", &self.soil_type.len())
            .field("season_classes", &self.season.len())
            .finish()
    }
}

/// What the loaded artifacts contain
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub model: ModelSummary,
    pub scaler: &'static str,
    pub feature_order: Vec<&'static str>,
    pub plants: Vec<String>,
    pub soil_types: Vec<String>,
    pub seasons: Vec<String>,
}
