/// Линейная регрессия с именованными признаками

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{Artifact, ModelError, Regressor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

fn default_name() -> String {
    "linear_regression".to_string()
}

impl Regressor for LinearRegressionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if features.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.ncols(),
            });
        }
        let weights = Array1::from(self.coefficients.clone());
        Ok(features.dot(&weights) + self.intercept)
    }
}

impl Artifact for LinearRegressionModel {
    const KIND: &'static str = "linear_regression";

    fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ModelError::InvalidModel(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if let Some(pos) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ModelError::InvalidModel(format!(
                "coefficient for {} is not finite",
                self.feature_names[pos]
            )));
        }
        Ok(())
    }
}
