//! Regression metrics and batch dashboard aggregates

use std::collections::BTreeMap;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{AccuracyMetrics, BatchBreakdowns, BatchKpis, LabelBreakdown, PredictedRecord};

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> PipelineResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::LengthMismatch {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(())
}

/// Mean squared error
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> PipelineResult<f64> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// Coefficient of determination.
///
/// A constant ground truth gives 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> PipelineResult<f64> {
    check_lengths(y_true, y_pred)?;
    let avg = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - avg).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// MSE and R² together
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> PipelineResult<AccuracyMetrics> {
    Ok(AccuracyMetrics {
        samples: y_true.len(),
        mse: mean_squared_error(y_true, y_pred)?,
        r2: r2_score(y_true, y_pred)?,
    })
}

fn column(records: &[PredictedRecord], field: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.fields.get(field).and_then(|v| v.as_f64()))
        .collect()
}

/// Headline indicators; `None` for an empty batch
pub fn batch_kpis(records: &[PredictedRecord]) -> Option<BatchKpis> {
    let water: Vec<f64> = records.iter().map(|r| r.water_mm).collect();
    Some(BatchKpis {
        observations: records.len(),
        mean_temperature: mean(&column(records, "temperature"))?,
        mean_humidity: mean(&column(records, "humidity"))?,
        mean_ph: mean(&column(records, "ph"))?,
        mean_water_mm: mean(&water)?,
    })
}

/// Mean prediction per label, ascending by mean. Unlabelled records are skipped.
pub fn breakdown_by<F>(records: &[PredictedRecord], label_of: F) -> Vec<LabelBreakdown>
where
    F: Fn(&PredictedRecord) -> Option<&str>,
{
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for record in records {
        if let Some(label) = label_of(record) {
            let entry = groups.entry(label).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += record.water_mm;
        }
    }

    let mut out: Vec<LabelBreakdown> = groups
        .into_iter()
        .map(|(label, (count, sum))| LabelBreakdown {
            label: label.to_string(),
            count,
            mean_water_mm: sum / count as f64,
        })
        .collect();
    out.sort_by(|a, b| a.mean_water_mm.total_cmp(&b.mean_water_mm));
    out
}

/// Breakdowns for plant, soil type and season
pub fn batch_breakdowns(records: &[PredictedRecord]) -> BatchBreakdowns {
    BatchBreakdowns {
        by_plant: breakdown_by(records, |r| r.plant_label.as_deref()),
        by_soil_type: breakdown_by(records, |r| r.soil_label.as_deref()),
        by_season: breakdown_by(records, |r| r.season_label.as_deref()),
    }
}
