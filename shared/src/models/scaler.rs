//! Pre-fitted numeric scalers applied before inference

use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;
use crate::models::record::{FeatureVector, FEATURE_COUNT};

/// Scaler artifact. Parameters are per feature, in model column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default = "enabled")]
        with_mean: bool,
        #[serde(default = "enabled")]
        with_std: bool,
    },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

fn enabled() -> bool {
    true
}

impl FeatureScaler {
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        FeatureScaler::Standard {
            mean,
            scale,
            with_mean: true,
            with_std: true,
        }
    }

    /// Scaler that leaves every feature untouched
    pub fn identity() -> Self {
        Self::standard(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT])
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeatureScaler::Standard { .. } => "standard",
            FeatureScaler::MinMax { .. } => "min_max",
        }
    }

    /// Check widths and parameters against the model layout
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        let (first, second) = match self {
            FeatureScaler::Standard { mean, scale, .. } => (mean, scale),
            FeatureScaler::MinMax { min, scale } => (min, scale),
        };

        if first.len() != FEATURE_COUNT || second.len() != FEATURE_COUNT {
            return Err(ArtifactLoadError::invalid(
                "scaler",
                format!(
                    "expected {} parameters per vector, got {} and {}",
                    FEATURE_COUNT,
                    first.len(),
                    second.len()
                ),
            ));
        }

        if first.iter().chain(second.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactLoadError::invalid(
                "scaler",
                "parameters must be finite",
            ));
        }

        if let FeatureScaler::Standard {
            scale,
            with_std: true,
            ..
        } = self
        {
            if let Some(i) = scale.iter().position(|s| *s == 0.0) {
                return Err(ArtifactLoadError::invalid(
                    "scaler",
                    format!("zero scale for feature {}", i),
                ));
            }
        }

        Ok(())
    }

    /// Apply the per-feature affine transform.
    ///
    /// Expects a validated scaler.
    pub fn transform(&self, vector: &FeatureVector) -> FeatureVector {
        let mut out = vector.values();
        match self {
            FeatureScaler::Standard {
                mean,
                scale,
                with_mean,
                with_std,
            } => {
                for (i, x) in out.iter_mut().enumerate() {
                    if *with_mean {
                        *x -= mean[i];
                    }
                    if *with_std {
                        *x /= scale[i];
                    }
                }
            }
            FeatureScaler::MinMax { min, scale } => {
                for (i, x) in out.iter_mut().enumerate() {
                    *x = *x * scale[i] + min[i];
                }
            }
        }
        FeatureVector::new(out)
    }
}
