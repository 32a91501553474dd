//! Tests for batch accuracy metrics and dashboard aggregates

use proptest::prelude::*;
use serde_json::{json, Map};
use shared::metrics::{accuracy, batch_breakdowns, batch_kpis, mean_squared_error, r2_score};
use shared::{ground_truth_values, has_ground_truth_column, PipelineError, PredictedRecord, Record};

fn predicted(plant: &str, season: &str, temperature: f64, water_mm: f64) -> PredictedRecord {
    let mut fields = Map::new();
    fields.insert("temperature".to_string(), json!(temperature));
    fields.insert("humidity".to_string(), json!(60.0));
    fields.insert("ph".to_string(), json!(6.5));
    PredictedRecord {
        fields,
        water_mm,
        plant_label: Some(plant.to_string()),
        soil_label: Some("limoneux".to_string()),
        season_label: Some(season.to_string()),
    }
}

fn with_truth(value: Option<serde_json::Value>) -> Record {
    let mut record = Record::new();
    record.set("N", 10.0);
    if let Some(v) = value {
        record.set("Eau_moyenne_mm_reel", v);
    }
    record
}

// =============================================================================
// Accuracy metrics
// =============================================================================

mod accuracy_metrics {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let y = [420.0, 510.5, 388.0];
        let metrics = accuracy(&y, &y).unwrap();
        assert_eq!(metrics.samples, 3);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn predicting_the_mean_scores_zero() {
        let y_true = [400.0, 500.0, 600.0];
        let y_pred = [500.0, 500.0, 500.0];
        assert!(r2_score(&y_true, &y_pred).unwrap().abs() < 1e-12);
    }

    #[test]
    fn constant_ground_truth() {
        assert_eq!(r2_score(&[450.0, 450.0], &[450.0, 450.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[450.0, 450.0], &[440.0, 460.0]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert_eq!(
            mean_squared_error(&[1.0, 2.0], &[1.0]),
            Err(PipelineError::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(mean_squared_error(&[], &[]), Err(PipelineError::EmptyInput));
    }

    proptest! {
        #[test]
        fn mse_is_non_negative(
            pairs in prop::collection::vec((0.0f64..2000.0, 0.0f64..2000.0), 1..50)
        ) {
            let (y_true, y_pred): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            prop_assert!(mean_squared_error(&y_true, &y_pred).unwrap() >= 0.0);
        }

        #[test]
        fn r2_never_exceeds_one(
            pairs in prop::collection::vec((0.0f64..2000.0, 0.0f64..2000.0), 1..50)
        ) {
            let (y_true, y_pred): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            prop_assert!(r2_score(&y_true, &y_pred).unwrap() <= 1.0 + 1e-12);
        }
    }
}

// =============================================================================
// Ground truth column
// =============================================================================

mod ground_truth {
    use super::*;

    #[test]
    fn complete_column_is_used() {
        let records = vec![with_truth(Some(json!(500.0))), with_truth(Some(json!(420)))];
        assert_eq!(ground_truth_values(&records), Some(vec![500.0, 420.0]));
    }

    #[test]
    fn partial_column_is_skipped() {
        let records = vec![with_truth(Some(json!(500.0))), with_truth(None)];
        assert!(has_ground_truth_column(&records));
        assert_eq!(ground_truth_values(&records), None);
    }

    #[test]
    fn null_or_text_values_do_not_count() {
        let records = vec![with_truth(Some(json!(500.0))), with_truth(Some(json!(null)))];
        assert_eq!(ground_truth_values(&records), None);

        let records = vec![with_truth(Some(json!("500")))];
        assert_eq!(ground_truth_values(&records), None);
    }

    #[test]
    fn absent_column() {
        let records = vec![with_truth(None)];
        assert!(!has_ground_truth_column(&records));
        assert_eq!(ground_truth_values(&records), None);
    }
}

// =============================================================================
// Dashboard aggregates
// =============================================================================

mod dashboard {
    use super::*;

    #[test]
    fn kpis_average_the_batch() {
        let records = vec![
            predicted("rice", "Hiver", 20.0, 600.0),
            predicted("maize", "Été", 30.0, 400.0),
        ];
        let kpis = batch_kpis(&records).unwrap();
        assert_eq!(kpis.observations, 2);
        assert_eq!(kpis.mean_temperature, 25.0);
        assert_eq!(kpis.mean_humidity, 60.0);
        assert_eq!(kpis.mean_ph, 6.5);
        assert_eq!(kpis.mean_water_mm, 500.0);
    }

    #[test]
    fn kpis_of_empty_batch() {
        assert!(batch_kpis(&[]).is_none());
    }

    #[test]
    fn breakdowns_are_sorted_by_mean() {
        let records = vec![
            predicted("rice", "Hiver", 20.0, 700.0),
            predicted("rice", "Été", 20.0, 500.0),
            predicted("maize", "Hiver", 20.0, 300.0),
            predicted("banana", "Été", 20.0, 450.0),
        ];
        let breakdowns = batch_breakdowns(&records);

        let plants: Vec<(&str, usize, f64)> = breakdowns
            .by_plant
            .iter()
            .map(|b| (b.label.as_str(), b.count, b.mean_water_mm))
            .collect();
        assert_eq!(
            plants,
            vec![("maize", 1, 300.0), ("banana", 1, 450.0), ("rice", 2, 600.0)]
        );

        assert_eq!(breakdowns.by_soil_type.len(), 1);
        assert_eq!(breakdowns.by_soil_type[0].count, 4);
        assert_eq!(breakdowns.by_season[0].label, "Été");
        assert_eq!(breakdowns.by_season[1].label, "Hiver");
    }
}
