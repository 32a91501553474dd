//! Input validation for pipeline records

use crate::error::{PipelineError, PipelineResult};
use crate::models::{Record, FEATURE_ORDER, GROUND_TRUTH_FIELD};

// ============================================================================
// Required Fields
// ============================================================================

/// Required feature columns absent from the record, in model order
pub fn missing_fields(record: &Record) -> Vec<&'static str> {
    FEATURE_ORDER
        .iter()
        .copied()
        .filter(|f| !record.contains(f))
        .collect()
}

/// Fail on the first required column that is absent or null
pub fn validate_required_fields(record: &Record) -> PipelineResult<()> {
    match missing_fields(record).first() {
        Some(field) => Err(PipelineError::MissingField {
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Ground Truth
// ============================================================================

/// Whether any record carries the ground-truth column
pub fn has_ground_truth_column(records: &[Record]) -> bool {
    records.iter().any(|r| r.contains(GROUND_TRUTH_FIELD))
}

/// Ground-truth values, only when every record has a numeric one
pub fn ground_truth_values(records: &[Record]) -> Option<Vec<f64>> {
    if records.is_empty() {
        return None;
    }
    records
        .iter()
        .map(|r| r.get(GROUND_TRUTH_FIELD).and_then(|v| v.as_f64()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Record {
        let mut record = Record::new();
        for field in FEATURE_ORDER {
            record.set(field, 1.0);
        }
        record
    }

    // ========================================================================
    // Required Field Tests
    // ========================================================================

    #[test]
    fn test_complete_record_is_valid() {
        assert!(validate_required_fields(&full_record()).is_ok());
        assert!(missing_fields(&full_record()).is_empty());
    }

    #[test]
    fn test_missing_fields_listed_in_model_order() {
        let mut map = full_record().into_map();
        map.remove("Saison");
        map.remove("N");
        map.remove("TMIN");
        let record = Record::from_map(map);

        assert_eq!(missing_fields(&record), vec!["N", "TMIN", "Saison"]);
        assert_eq!(
            validate_required_fields(&record),
            Err(PipelineError::MissingField {
                field: "N".to_string()
            })
        );
    }

    #[test]
    fn test_null_field_is_missing() {
        let mut record = full_record();
        record.set("humidity", serde_json::Value::Null);
        assert_eq!(missing_fields(&record), vec!["humidity"]);
    }

    // ========================================================================
    // Ground Truth Tests
    // ========================================================================

    #[test]
    fn test_ground_truth_all_present() {
        let mut a = full_record();
        a.set(GROUND_TRUTH_FIELD, 410.0);
        let mut b = full_record();
        b.set(GROUND_TRUTH_FIELD, json!(390));
        assert_eq!(ground_truth_values(&[a, b]), Some(vec![410.0, 390.0]));
    }

    #[test]
    fn test_ground_truth_partial_column() {
        let mut a = full_record();
        a.set(GROUND_TRUTH_FIELD, 410.0);
        let b = full_record();
        let records = [a, b];
        assert!(has_ground_truth_column(&records));
        assert_eq!(ground_truth_values(&records), None);
    }

    #[test]
    fn test_ground_truth_absent() {
        let records = [full_record()];
        assert!(!has_ground_truth_column(&records));
        assert_eq!(ground_truth_values(&records), None);
    }
}
