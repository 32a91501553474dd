//! Observation records and the fixed model feature layout

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PipelineError, PipelineResult};

/// Number of features consumed by the model
pub const FEATURE_COUNT: usize = 15;

/// Column order the scaler and the model were fitted on. Never reorder.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
    "nom_plante",
    "type_sol",
    "RR",
    "TMAX",
    "TMIN",
    "UMAX",
    "UMIN",
    "Saison",
];

/// Output column holding the predicted water requirement (mm per cycle)
pub const PREDICTION_FIELD: &str = "Eau_moyenne_mm";

/// Optional ground-truth column used for accuracy reporting
pub const GROUND_TRUTH_FIELD: &str = "Eau_moyenne_mm_reel";

/// The three label-encoded columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Plant,
    SoilType,
    Season,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [
        CategoricalField::Plant,
        CategoricalField::SoilType,
        CategoricalField::Season,
    ];

    /// Input column name
    pub fn column(&self) -> &'static str {
        match self {
            CategoricalField::Plant => "nom_plante",
            CategoricalField::SoilType => "type_sol",
            CategoricalField::Season => "Saison",
        }
    }

    /// Column name of the decoded, human-readable label
    pub fn label_column(&self) -> &'static str {
        match self {
            CategoricalField::Plant => "Plante_label",
            CategoricalField::SoilType => "Sol_label",
            CategoricalField::Season => "Saison_label",
        }
    }

    /// Position in the feature vector
    pub fn feature_index(&self) -> usize {
        match self {
            CategoricalField::Plant => 7,
            CategoricalField::SoilType => 8,
            CategoricalField::Season => 14,
        }
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A categorical value as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    /// Human-readable label still to be encoded
    Raw(String),
    /// Already label-encoded integer
    Coded(i64),
}

impl Category {
    /// Resolve the JSON representation of a categorical column.
    ///
    /// Strings are raw labels, integral numbers are codes. Anything else is rejected.
    /// Integral codes beyond the `i64` range saturate; no vocabulary reaches them.
    pub fn from_value(field: CategoricalField, value: &Value) -> PipelineResult<Self> {
        match value {
            Value::String(label) => Ok(Category::Raw(label.clone())),
            Value::Number(n) => {
                if let Some(code) = n.as_i64() {
                    return Ok(Category::Coded(code));
                }
                if n.is_u64() {
                    return Ok(Category::Coded(i64::MAX));
                }
                match n.as_f64() {
                    // `as` saturates at the i64 bounds
                    Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(Category::Coded(f as i64)),
                    _ => Err(PipelineError::InvalidValue {
                        field: field.column().to_string(),
                        reason: format!("{} is not an integer class code", n),
                    }),
                }
            }
            Value::Null => Err(PipelineError::MissingField {
                field: field.column().to_string(),
            }),
            other => Err(PipelineError::InvalidValue {
                field: field.column().to_string(),
                reason: format!("expected a label or an integer code, got {}", json_kind(other)),
            }),
        }
    }
}

/// One observation: field name to raw JSON value.
///
/// Extra fields are kept as-is and travel with the record to the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Value of a field; `null` counts as absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Read a numeric field without any coercion
    pub fn number(&self, field: &str) -> PipelineResult<f64> {
        let value = self.get(field).ok_or_else(|| PipelineError::MissingField {
            field: field.to_string(),
        })?;

        value.as_f64().ok_or_else(|| PipelineError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a number, got {}", json_kind(value)),
        })
    }

    /// Resolve a categorical column into its tagged representation
    pub fn category(&self, field: CategoricalField) -> PipelineResult<Category> {
        let value = self
            .get(field.column())
            .ok_or_else(|| PipelineError::MissingField {
                field: field.column().to_string(),
            })?;
        Category::from_value(field, value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}

/// Model input: the 15 features in [`FEATURE_ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
