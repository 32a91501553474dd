//! Regression models consumed by the pipeline
//!
//! The shipped model is a gradient-boosted ensemble of regression trees:
//! `init_prediction + learning_rate * sum(tree(x))`. Each tree is stored as
//! parallel node arrays; a node whose left child is `-1` is a leaf.
//!
//! Split tests narrow the feature to `f32` before comparing it with the
//! node threshold; the trees were fitted on single-precision inputs.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;
use crate::models::record::{FeatureVector, FEATURE_COUNT};

/// Marker for leaf nodes in `children_left` / `children_right`
pub const TREE_LEAF: i64 = -1;

/// Anything that maps scaled feature vectors to a prediction
pub trait Regressor: Debug + Send + Sync {
    /// Number of input features
    fn n_features(&self) -> usize;

    /// One prediction per row
    fn predict(&self, rows: &[FeatureVector]) -> Vec<f64>;

    /// Short description for diagnostics
    fn describe(&self) -> ModelSummary;
}

/// Model metadata exposed to clients
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub kind: String,
    pub n_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_estimators: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,
}

/// Serialized tree, one entry per node in each array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

/// Serialized gradient boosting model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingSpec {
    pub n_features: usize,
    pub learning_rate: f64,
    pub init_prediction: f64,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A validated regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Build from parallel arrays, checking every index.
    ///
    /// Children must point forward (`child > parent`), which rules out cycles.
    pub fn from_spec(spec: &TreeSpec, n_features: usize) -> Result<Self, ArtifactLoadError> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err(ArtifactLoadError::invalid("model", "tree has no nodes"));
        }
        if spec.children_right.len() != n
            || spec.feature.len() != n
            || spec.threshold.len() != n
            || spec.value.len() != n
        {
            return Err(ArtifactLoadError::invalid(
                "model",
                "inconsistent tree array lengths",
            ));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = spec.children_left[i];
            let right = spec.children_right[i];

            if left == TREE_LEAF {
                nodes.push(Node::Leaf(spec.value[i]));
                continue;
            }

            let child = |c: i64| -> Result<usize, ArtifactLoadError> {
                usize::try_from(c)
                    .ok()
                    .filter(|c| *c > i && *c < n)
                    .ok_or_else(|| {
                        ArtifactLoadError::invalid(
                            "model",
                            format!("node {} has invalid child index {}", i, c),
                        )
                    })
            };

            let feature = usize::try_from(spec.feature[i])
                .ok()
                .filter(|f| *f < n_features)
                .ok_or_else(|| {
                    ArtifactLoadError::invalid(
                        "model",
                        format!("node {} splits on invalid feature {}", i, spec.feature[i]),
                    )
                })?;

            nodes.push(Node::Split {
                feature,
                threshold: spec.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Leaf value reached by `features`
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = f64::from(features[feature] as f32);
                    idx = if x <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Gradient-boosted regression tree ensemble
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    trees: Vec<RegressionTree>,
    learning_rate: f64,
    init_prediction: f64,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn from_spec(spec: &GradientBoostingSpec) -> Result<Self, ArtifactLoadError> {
        if spec.n_features != FEATURE_COUNT {
            return Err(ArtifactLoadError::invalid(
                "model",
                format!(
                    "model expects {} features, pipeline produces {}",
                    spec.n_features, FEATURE_COUNT
                ),
            ));
        }
        if spec.trees.is_empty() {
            return Err(ArtifactLoadError::invalid("model", "ensemble has no trees"));
        }
        if !spec.learning_rate.is_finite() || !spec.init_prediction.is_finite() {
            return Err(ArtifactLoadError::invalid(
                "model",
                "learning rate and initial prediction must be finite",
            ));
        }

        let trees = spec
            .trees
            .iter()
            .map(|t| RegressionTree::from_spec(t, spec.n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            learning_rate: spec.learning_rate,
            init_prediction: spec.init_prediction,
            n_features: spec.n_features,
        })
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Prediction for a single scaled row
    pub fn predict_one(&self, features: &FeatureVector) -> f64 {
        let x = features.as_slice();
        let mut score = self.init_prediction;
        for tree in &self.trees {
            score += self.learning_rate * tree.predict(x);
        }
        score
    }
}

impl Regressor for GradientBoostingRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }

    fn describe(&self) -> ModelSummary {
        ModelSummary {
            kind: "gradient_boosting_regressor".to_string(),
            n_features: self.n_features,
            n_estimators: Some(self.trees.len()),
            learning_rate: Some(self.learning_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x[0] <= 0.5 ? 1.0 : 3.0
    fn stump(feature: i64, threshold: f64, left: f64, right: f64) -> TreeSpec {
        TreeSpec {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    fn row(first: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = first;
        FeatureVector::new(values)
    }

    #[test]
    fn test_stump_routes_left_on_equal() {
        let tree = RegressionTree::from_spec(&stump(0, 0.5, 1.0, 3.0), FEATURE_COUNT).unwrap();
        assert_eq!(tree.predict(row(0.5).as_slice()), 1.0);
        assert_eq!(tree.predict(row(0.6).as_slice()), 3.0);
    }

    #[test]
    fn test_threshold_compared_in_single_precision() {
        // 0.1f64 rounds up when narrowed to f32, so it goes right of a
        // threshold equal to 0.1f64 in single precision comparison.
        let threshold = 0.1f64;
        assert!(f64::from(threshold as f32) > threshold);
        let tree =
            RegressionTree::from_spec(&stump(0, threshold, 1.0, 3.0), FEATURE_COUNT).unwrap();
        assert_eq!(tree.predict(row(0.1).as_slice()), 3.0);
    }

    #[test]
    fn test_ensemble_sum() {
        let spec = GradientBoostingSpec {
            n_features: FEATURE_COUNT,
            learning_rate: 0.5,
            init_prediction: 10.0,
            trees: vec![stump(0, 0.0, -2.0, 2.0), stump(0, 5.0, 4.0, 8.0)],
        };
        let model = GradientBoostingRegressor::from_spec(&spec).unwrap();
        assert_eq!(model.n_estimators(), 2);
        // 10 + 0.5 * (2 + 4)
        assert_eq!(model.predict(&[row(1.0)]), vec![13.0]);
        // 10 + 0.5 * (-2 + 4)
        assert_eq!(model.predict(&[row(-1.0)]), vec![11.0]);
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let spec = GradientBoostingSpec {
            n_features: 14,
            learning_rate: 0.1,
            init_prediction: 0.0,
            trees: vec![stump(0, 0.0, 0.0, 0.0)],
        };
        assert!(GradientBoostingRegressor::from_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_split_feature() {
        assert!(RegressionTree::from_spec(&stump(15, 0.0, 0.0, 0.0), FEATURE_COUNT).is_err());
    }

    #[test]
    fn test_rejects_backward_child() {
        let spec = TreeSpec {
            children_left: vec![0, -1],
            children_right: vec![1, -1],
            feature: vec![0, -2],
            threshold: vec![0.0, -2.0],
            value: vec![0.0, 1.0],
        };
        assert!(RegressionTree::from_spec(&spec, FEATURE_COUNT).is_err());
    }

    #[test]
    fn test_rejects_ragged_arrays() {
        let mut spec = stump(0, 0.0, 0.0, 0.0);
        spec.value.pop();
        assert!(RegressionTree::from_spec(&spec, FEATURE_COUNT).is_err());
    }
}
