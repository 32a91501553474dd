//! Label encoders for the categorical columns
//!
//! An encoder is the closed vocabulary fixed at training time: class `i`
//! is encoded as the integer `i`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, PipelineError, PipelineResult};
use crate::models::record::{CategoricalField, Category};

/// Serialized form of an encoder artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSpec {
    pub classes: Vec<String>,
}

/// Bijection between known labels and `0..k`
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: CategoricalField,
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder, rejecting empty or duplicated vocabularies
    pub fn new(field: CategoricalField, classes: Vec<String>) -> Result<Self, ArtifactLoadError> {
        if classes.is_empty() {
            return Err(ArtifactLoadError::invalid(
                artifact_name(field),
                "encoder has no classes",
            ));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if index.insert(label.clone(), code).is_some() {
                return Err(ArtifactLoadError::invalid(
                    artifact_name(field),
                    format!("duplicate class '{}'", label),
                ));
            }
        }

        Ok(Self {
            field,
            classes,
            index,
        })
    }

    pub fn from_spec(field: CategoricalField, spec: EncoderSpec) -> Result<Self, ArtifactLoadError> {
        Self::new(field, spec.classes)
    }

    pub fn field(&self) -> CategoricalField {
        self.field
    }

    /// Known labels, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Code of a known label
    pub fn transform(&self, label: &str) -> PipelineResult<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: self.field.column(),
                label: label.to_string(),
            })
    }

    /// Encode a resolved category. Pre-encoded integers must be in range.
    pub fn encode(&self, category: &Category) -> PipelineResult<usize> {
        match category {
            Category::Raw(label) => self.transform(label),
            Category::Coded(code) => self.check_code(*code),
        }
    }

    /// Label of a code
    pub fn decode(&self, code: i64) -> PipelineResult<&str> {
        let index = self.check_code(code)?;
        Ok(&self.classes[index])
    }

    fn check_code(&self, code: i64) -> PipelineResult<usize> {
        usize::try_from(code)
            .ok()
            .filter(|c| *c < self.classes.len())
            .ok_or(PipelineError::UnknownCode {
                field: self.field.column(),
                code,
                classes: self.classes.len(),
            })
    }
}

fn artifact_name(field: CategoricalField) -> &'static str {
    match field {
        CategoricalField::Plant => "plant encoder",
        CategoricalField::SoilType => "soil type encoder",
        CategoricalField::Season => "season encoder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasons() -> LabelEncoder {
        LabelEncoder::new(
            CategoricalField::Season,
            ["Automne", "Hiver", "Printemps", "Été"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_transform_known_label() {
        let enc = seasons();
        assert_eq!(enc.transform("Hiver").unwrap(), 1);
        assert_eq!(enc.transform("Été").unwrap(), 3);
    }

    #[test]
    fn test_transform_unknown_label() {
        let err = seasons().transform("Mousson").unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownCategory {
                field: "Saison",
                label: "Mousson".to_string()
            }
        );
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(seasons().transform("hiver").is_err());
    }

    #[test]
    fn test_coded_values_checked_against_vocabulary() {
        let enc = seasons();
        assert_eq!(enc.encode(&Category::Coded(0)).unwrap(), 0);
        assert_eq!(enc.encode(&Category::Coded(3)).unwrap(), 3);
        assert!(matches!(
            enc.encode(&Category::Coded(4)),
            Err(PipelineError::UnknownCode { code: 4, classes: 4, .. })
        ));
        assert!(matches!(
            enc.encode(&Category::Coded(-1)),
            Err(PipelineError::UnknownCode { code: -1, .. })
        ));
    }

    #[test]
    fn test_decode() {
        let enc = seasons();
        assert_eq!(enc.decode(2).unwrap(), "Printemps");
        assert!(enc.decode(9).is_err());
    }

    #[test]
    fn test_rejects_duplicate_classes() {
        let result = LabelEncoder::new(
            CategoricalField::SoilType,
            vec!["argileux".to_string(), "argileux".to_string()],
        );
        assert!(matches!(result, Err(ArtifactLoadError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_empty_vocabulary() {
        assert!(LabelEncoder::new(CategoricalField::Plant, vec![]).is_err());
    }
}
