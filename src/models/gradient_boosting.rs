//! Градиентный бустинг деревьев регрессии (формат в духе XGBoost)

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{Artifact, ModelError, Regressor};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        /// Куда идет пропущенное значение (NaN)
        #[serde(default = "default_left")]
        default_left: bool,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

fn default_left() -> bool {
    true
}

impl TreeNode {
    fn predict_single(&self, sample: ArrayView1<f64>) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                default_left,
                left,
                right,
            } => {
                let x = sample[*feature];
                let go_left = if x.is_nan() { *default_left } else { x < *threshold };
                if go_left {
                    left.predict_single(sample)
                } else {
                    right.predict_single(sample)
                }
            }
        }
    }

    fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature, left, right, ..
            } => [Some(*feature), left.max_feature(), right.max_feature()]
                .into_iter()
                .flatten()
                .max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub feature_names: Vec<String>,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<TreeNode>,
}

fn default_name() -> String {
    "xgboost".to_string()
}

fn default_base_score() -> f64 {
    0.5
}

impl Regressor for GradientBoostedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if features.ncols() != self.feature_names.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_names.len(),
                actual: features.ncols(),
            });
        }

        let mut predictions = Array1::from_elem(features.nrows(), self.base_score);
        for (i, row) in features.rows().into_iter().enumerate() {
            predictions[i] += self.trees.iter().map(|t| t.predict_single(row)).sum::<f64>();
        }
        Ok(predictions)
    }
}

impl Artifact for GradientBoostedModel {
    const KIND: &'static str = "gradient_boosting";

    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("ensemble has no trees".to_string()));
        }
        let max_feature = self.trees.iter().filter_map(TreeNode::max_feature).max();
        if let Some(feature) = max_feature {
            if feature >= self.feature_names.len() {
                return Err(ModelError::InvalidModel(format!(
                    "split on feature {} but only {} features are named",
                    feature,
                    self.feature_names.len()
                )));
            }
        }
        Ok(())
    }
}
