//! Gradient-boosted regression trees.
//!
//! Layout follows the usual exported form of a fitted boosting regressor:
//! a constant initial prediction, a learning rate, and a list of trees whose
//! nodes are stored flat with node 0 as the root.

use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::PredictionServiceError;
use crate::features::{FeatureVector, Field};

/// A node in a regression tree.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal split: go left when `x[feature] <= threshold`
    Split {
        feature: Field,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf with its regression value
    Leaf { value: f64 },
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk from the root to a leaf.
    ///
    /// A malformed tree (dangling child index, or a cycle) yields an error
    /// instead of panicking or looping forever.
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64, PredictionServiceError> {
        let mut index = 0;
        // Any path longer than the node count must revisit a node
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(index).ok_or_else(|| {
                PredictionServiceError::new(format!("tree references missing node {}", index))
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(PredictionServiceError::new("tree contains a cycle"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradientBoostingModel {
    /// Constant prediction before any tree (usually the training mean)
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl Predictor for GradientBoostingModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionServiceError> {
        let mut total = 0.0;
        for (i, tree) in self.trees.iter().enumerate() {
            let leaf = tree.evaluate(features).map_err(|e| {
                PredictionServiceError::new(format!("tree {}: {}", i, e.message))
            })?;
            total += leaf;
        }
        Ok(self.init + self.learning_rate * total)
    }

    fn describe(&self) -> String {
        format!(
            "gradient boosting ({} trees, learning rate {})",
            self.trees.len(),
            self.learning_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: Field, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    fn vector_with(field: Field, value: f64) -> FeatureVector {
        let mut values = [0.0; 10];
        values[field.index()] = value;
        FeatureVector::new(values)
    }

    #[test]
    fn test_stump_goes_left_on_equal() {
        let tree = stump(Field::Bmi, 0.0, -10.0, 10.0);
        assert_eq!(tree.evaluate(&vector_with(Field::Bmi, 0.0)).unwrap(), -10.0);
        assert_eq!(tree.evaluate(&vector_with(Field::Bmi, 0.01)).unwrap(), 10.0);
    }

    #[test]
    fn test_ensemble_sum() {
        let model = GradientBoostingModel {
            init: 150.0,
            learning_rate: 0.5,
            trees: vec![
                stump(Field::Bmi, 0.0, -20.0, 40.0),
                stump(Field::S5, 0.0, -10.0, 30.0),
            ],
        };
        let mut values = [0.0; 10];
        values[Field::Bmi.index()] = 0.05;
        values[Field::S5.index()] = -0.02;
        let result = model.predict(&FeatureVector::new(values)).unwrap();
        assert_eq!(result, 150.0 + 0.5 * (40.0 - 10.0));
    }

    #[test]
    fn test_dangling_child() {
        let tree = RegressionTree {
            nodes: vec![TreeNode::Split {
                feature: Field::Age,
                threshold: 0.0,
                left: 5,
                right: 6,
            }],
        };
        let err = tree.evaluate(&FeatureVector::new([0.0; 10])).unwrap_err();
        assert!(err.message.contains("missing node 5"));
    }

    #[test]
    fn test_cycle_detected() {
        let tree = RegressionTree {
            nodes: vec![TreeNode::Split {
                feature: Field::Age,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        let err = tree.evaluate(&FeatureVector::new([0.0; 10])).unwrap_err();
        assert!(err.message.contains("cycle"));
    }

    #[test]
    fn test_error_names_tree() {
        let model = GradientBoostingModel {
            init: 0.0,
            learning_rate: 1.0,
            trees: vec![
                stump(Field::Age, 0.0, 1.0, 2.0),
                RegressionTree { nodes: vec![] },
            ],
        };
        let err = model.predict(&FeatureVector::new([0.0; 10])).unwrap_err();
        assert!(err.message.starts_with("tree 1:"));
    }

    #[test]
    fn test_parse_nodes_json() {
        let json = r#"{"nodes": [
            {"feature": "bmi", "threshold": 0.01, "left": 1, "right": 2},
            {"value": -12.5},
            {"value": 30.0}
        ]}"#;
        let tree: RegressionTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.nodes[1], TreeNode::Leaf { value: -12.5 });
    }
}
