//! Water requirement prediction pipeline
//!
//! raw record -> categorical encoding -> feature vector -> scaling ->
//! inference -> label decoding. Every stage returns a `Result` and the
//! artifacts are passed in explicitly; nothing here holds state.

use crate::artifacts::PipelineArtifacts;
use crate::error::{PipelineError, PipelineResult, RecordError};
use crate::models::{
    CategoricalField, FeatureVector, LabelEncoder, PredictedRecord, Record, FEATURE_COUNT,
    FEATURE_ORDER, PREDICTION_FIELD,
};
use crate::validation::validate_required_fields;

/// Encode one categorical column in place and return its code.
///
/// Raw labels are looked up in the encoder vocabulary; integer codes are
/// kept after a range check.
pub fn encode(
    record: &mut Record,
    field: CategoricalField,
    encoder: &LabelEncoder,
) -> PipelineResult<usize> {
    let category = record.category(field)?;
    let code = encoder.encode(&category)?;
    record.set(field.column(), code);
    Ok(code)
}

/// Select the model features in their fixed order.
///
/// Categorical columns must already hold integer codes.
pub fn build_feature_vector(record: &Record) -> PipelineResult<FeatureVector> {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, field) in values.iter_mut().zip(FEATURE_ORDER) {
        *slot = record.number(field)?;
    }
    Ok(FeatureVector::new(values))
}

/// Apply the fitted scaler
pub fn scale(artifacts: &PipelineArtifacts, vector: &FeatureVector) -> FeatureVector {
    artifacts.scaler().transform(vector)
}

/// Run the model on scaled rows, one value per row
pub fn predict(artifacts: &PipelineArtifacts, scaled: &[FeatureVector]) -> Vec<f64> {
    if scaled.is_empty() {
        return Vec::new();
    }
    artifacts.model().predict(scaled)
}

/// Display label of an encoded category
pub fn decode(
    artifacts: &PipelineArtifacts,
    code: i64,
    field: CategoricalField,
) -> PipelineResult<&str> {
    artifacts.decode(code, field)
}

/// Binds the pipeline stages to one set of artifacts
#[derive(Debug, Clone, Copy)]
pub struct PredictionPipeline<'a> {
    artifacts: &'a PipelineArtifacts,
}

impl<'a> PredictionPipeline<'a> {
    pub fn new(artifacts: &'a PipelineArtifacts) -> Self {
        Self { artifacts }
    }

    /// Validation, encoding and feature assembly for one record
    pub fn prepare(&self, mut record: Record) -> PipelineResult<(Record, FeatureVector)> {
        validate_required_fields(&record)?;
        for field in CategoricalField::ALL {
            encode(&mut record, field, self.artifacts.encoder(field))?;
        }
        let features = build_feature_vector(&record)?;
        Ok((record, features))
    }

    /// Full pipeline for a single record
    pub fn run_one(&self, record: Record) -> PipelineResult<PredictedRecord> {
        let mut predicted = self.run_batch(vec![record]).map_err(|e| e.source)?;
        predicted.pop().ok_or(PipelineError::EmptyInput)
    }

    /// Full pipeline over a batch.
    ///
    /// Every record is prepared before the model runs once over the whole
    /// batch; the first failing record aborts the batch.
    pub fn run_batch(&self, records: Vec<Record>) -> Result<Vec<PredictedRecord>, RecordError> {
        let mut prepared = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let entry = self
                .prepare(record)
                .map_err(|source| RecordError { index, source })?;
            prepared.push(entry);
        }

        let scaled: Vec<FeatureVector> = prepared
            .iter()
            .map(|(_, features)| scale(self.artifacts, features))
            .collect();
        let predictions = predict(self.artifacts, &scaled);

        Ok(prepared
            .into_iter()
            .zip(predictions)
            .map(|((record, features), water_mm)| self.finish(record, &features, water_mm))
            .collect())
    }

    fn finish(&self, record: Record, features: &FeatureVector, water_mm: f64) -> PredictedRecord {
        let label = |field: CategoricalField| {
            let code = features.get(field.feature_index())? as i64;
            decode(self.artifacts, code, field).ok().map(str::to_string)
        };
        let plant_label = label(CategoricalField::Plant);
        let soil_label = label(CategoricalField::SoilType);
        let season_label = label(CategoricalField::Season);

        let mut fields = record.into_map();
        fields.remove(PREDICTION_FIELD);
        for field in CategoricalField::ALL {
            fields.remove(field.label_column());
        }

        PredictedRecord {
            fields,
            water_mm,
            plant_label,
            soil_label,
            season_label,
        }
    }
}
