//! Prediction outputs and batch dashboard summaries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record after inference: original fields, encoded categories,
/// the prediction, and the decoded display labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "Eau_moyenne_mm")]
    pub water_mm: f64,
    #[serde(rename = "Plante_label")]
    pub plant_label: Option<String>,
    #[serde(rename = "Sol_label")]
    pub soil_label: Option<String>,
    #[serde(rename = "Saison_label")]
    pub season_label: Option<String>,
}

/// Headline indicators of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchKpis {
    pub observations: usize,
    pub mean_temperature: f64,
    pub mean_humidity: f64,
    pub mean_ph: f64,
    pub mean_water_mm: f64,
}

/// Accuracy against the ground-truth column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccuracyMetrics {
    pub samples: usize,
    pub mse: f64,
    pub r2: f64,
}

/// Mean prediction for one label value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelBreakdown {
    pub label: String,
    pub count: usize,
    pub mean_water_mm: f64,
}

/// Predictions grouped by each categorical column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchBreakdowns {
    pub by_plant: Vec<LabelBreakdown>,
    pub by_soil_type: Vec<LabelBreakdown>,
    pub by_season: Vec<LabelBreakdown>,
}
