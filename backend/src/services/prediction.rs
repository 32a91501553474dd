//! Water requirement prediction service
//! Runs the pipeline for single form submissions and uploaded batches, and
//! builds the dashboard summary of a batch

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::catalog::{plant_display_name, resolve_plant};
use shared::metrics::{accuracy, batch_breakdowns, batch_kpis};
use shared::{
    ground_truth_values, has_ground_truth_column, AccuracyMetrics, BatchBreakdowns, BatchKpis,
    CategoricalField, PipelineArtifacts, PredictedRecord, PredictionPipeline, Record,
    FEATURE_ORDER, PREDICTION_FIELD,
};
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::error::{AppError, AppResult};

/// Prediction service bound to the loaded artifacts
#[derive(Clone)]
pub struct PredictionService {
    artifacts: Arc<PipelineArtifacts>,
    limits: BatchConfig,
}

/// Column of the single-record form that accepts French plant names
const PLANT_FIELD: &str = "nom_plante";

/// Result of a form submission
#[derive(Debug, Serialize)]
pub struct SinglePrediction {
    #[serde(rename = "Eau_moyenne_mm")]
    pub water_mm: f64,
    pub plant_label_fr: Option<&'static str>,
    pub message_en: String,
    pub message_fr: String,
    pub record: PredictedRecord,
}

/// Result of a batch run
#[derive(Debug, Serialize)]
pub struct BatchPrediction {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub kpis: Option<BatchKpis>,
    /// Present only when every record carries `Eau_moyenne_mm_reel`
    pub metrics: Option<AccuracyMetrics>,
    pub breakdowns: BatchBreakdowns,
    pub records: Vec<PredictedRecord>,
}

impl PredictionService {
    pub fn new(artifacts: Arc<PipelineArtifacts>, limits: BatchConfig) -> Self {
        Self { artifacts, limits }
    }

    /// Predict the water requirement of a single form submission
    pub fn predict_form(&self, form: Record) -> AppResult<SinglePrediction> {
        let pipeline = PredictionPipeline::new(&self.artifacts);
        let record = pipeline.run_one(form)?;

        let plant_label_fr = record.plant_label.as_deref().and_then(plant_display_name);
        tracing::debug!(
            plant = record.plant_label.as_deref().unwrap_or("?"),
            water_mm = record.water_mm,
            "Single prediction"
        );

        Ok(SinglePrediction {
            water_mm: record.water_mm,
            plant_label_fr,
            message_en: format!("Estimated water requirement: {:.2} mm/cycle", record.water_mm),
            message_fr: format!("Besoin en eau estimé : {:.2} mm/cycle", record.water_mm),
            record,
        })
    }

    /// Run the pipeline over a batch and summarise it
    pub fn predict_batch(&self, records: Vec<Record>) -> AppResult<BatchPrediction> {
        if records.is_empty() {
            return Err(AppError::EmptyBatch);
        }
        if records.len() > self.limits.max_records {
            return Err(AppError::BatchTooLarge {
                count: records.len(),
                limit: self.limits.max_records,
            });
        }

        let batch_id = Uuid::new_v4();
        let truth = ground_truth_values(&records);
        if truth.is_none() && has_ground_truth_column(&records) {
            tracing::warn!(
                %batch_id,
                "Ground truth column is incomplete, skipping accuracy metrics"
            );
        }

        let pipeline = PredictionPipeline::new(&self.artifacts);
        let predicted = pipeline.run_batch(records)?;

        let metrics = match truth {
            Some(y_true) => {
                let y_pred: Vec<f64> = predicted.iter().map(|r| r.water_mm).collect();
                Some(accuracy(&y_true, &y_pred)?)
            }
            None => None,
        };

        tracing::info!(
            %batch_id,
            records = predicted.len(),
            mse = metrics.map(|m| m.mse),
            r2 = metrics.map(|m| m.r2),
            "Batch prediction completed"
        );

        Ok(BatchPrediction {
            batch_id,
            generated_at: Utc::now(),
            kpis: batch_kpis(&predicted),
            metrics,
            breakdowns: batch_breakdowns(&predicted),
            records: predicted,
        })
    }

    /// Parse a form submission: one JSON object.
    ///
    /// Values are kept as sent so type errors surface from the pipeline. A
    /// French plant name is replaced by its code.
    pub fn parse_form(bytes: &[u8]) -> AppResult<Record> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::InvalidForm(format!("not valid JSON: {}", e)))?;

        let Value::Object(map) = value else {
            return Err(AppError::InvalidForm("expected a JSON object".to_string()));
        };

        let mut record = Record::from_map(map);
        let plant_code = match record.get(PLANT_FIELD) {
            Some(Value::String(plant)) => Some(resolve_plant(plant.trim()).to_string()),
            _ => None,
        };
        if let Some(code) = plant_code {
            record.set(PLANT_FIELD, code);
        }
        Ok(record)
    }

    /// Parse an uploaded batch: a JSON array of record objects
    pub fn parse_batch(bytes: &[u8]) -> AppResult<Vec<Record>> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AppError::InvalidBatch(format!("not valid JSON: {}", e)))?;

        let Value::Array(items) = value else {
            return Err(AppError::InvalidBatch(
                "expected an array of records".to_string(),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(Record::from_map(map)),
                _ => Err(AppError::InvalidBatch(format!(
                    "record {} is not an object",
                    i
                ))),
            })
            .collect()
    }

    /// Export predicted records as CSV.
    ///
    /// Model columns come first, then the prediction and labels, then any
    /// extra input columns in name order.
    pub fn export_to_csv(records: &[PredictedRecord]) -> AppResult<String> {
        let label_columns: Vec<&str> = CategoricalField::ALL
            .iter()
            .map(|f| f.label_column())
            .collect();

        let extras: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.fields.keys().map(String::as_str))
            .filter(|k| !FEATURE_ORDER.contains(k))
            .collect();

        let mut header: Vec<&str> = FEATURE_ORDER.to_vec();
        header.push(PREDICTION_FIELD);
        header.extend(&label_columns);
        header.extend(extras.iter().copied());

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&header)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;

        for record in records {
            let row: Vec<String> = header
                .iter()
                .map(|column| csv_cell(record, column))
                .collect();
            wtr.write_record(&row)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

fn csv_cell(record: &PredictedRecord, column: &str) -> String {
    let label = match column {
        PREDICTION_FIELD => return record.water_mm.to_string(),
        "Plante_label" => Some(&record.plant_label),
        "Sol_label" => Some(&record.soil_label),
        "Saison_label" => Some(&record.season_label),
        _ => None,
    };
    if let Some(label) = label {
        return label.clone().unwrap_or_default();
    }
    value_cell(&record.fields, column)
}

fn value_cell(fields: &Map<String, Value>, column: &str) -> String {
    match fields.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
