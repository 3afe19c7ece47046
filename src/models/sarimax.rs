//! SARIMAX: регрессия на экзогенные признаки с ARMA-ошибками
//!
//! Сезонные полиномы хранятся уже перемноженными с несезонными,
//! поэтому `ar` и `ma` могут содержать лаги вида 7, 14 и т.д.

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{Artifact, ForecastResult, Forecaster, ModelError, NOMINAL_COVERAGE};

/// Квантиль нормального распределения для 95% интервала
const Z_95: f64 = 1.959_963_984_540_054;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarimaxModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub exog_names: Vec<String>,
    #[serde(default)]
    pub intercept: f64,
    pub exog_coefficients: Vec<f64>,
    #[serde(default)]
    pub ar: Vec<f64>,
    #[serde(default)]
    pub ma: Vec<f64>,
    /// Последние значения ARMA-ошибки на конце обучающей выборки (старые первыми)
    #[serde(default)]
    pub residual_state: Vec<f64>,
    /// Последние инновации (старые первыми)
    #[serde(default)]
    pub innovation_state: Vec<f64>,
    pub sigma2: f64,
}

fn default_name() -> String {
    "sarimax".to_string()
}

impl SarimaxModel {
    /// Регрессионная часть: c + X·β
    fn regression_mean(&self, X: &Array2<f64>) -> Array1<f64> {
        let beta = Array1::from(self.exog_coefficients.clone());
        X.dot(&beta) + self.intercept
    }

    /// Прогноз ARMA-ошибки на `steps` шагов из сохраненного состояния
    fn error_path(&self, steps: usize) -> Vec<f64> {
        let p = self.ar.len();
        let q = self.ma.len();

        // История ошибок: состояние + прогнозы
        let mut u: Vec<f64> = self.residual_state.clone();
        let offset = u.len();

        for h in 0..steps {
            let mut value = 0.0;
            for i in 1..=p {
                let idx = offset + h;
                if idx >= i {
                    value += self.ar[i - 1] * u[idx - i];
                }
            }
            // Будущие инновации имеют нулевое ожидание
            for j in (h + 1)..=q {
                let back = j - h;
                if back <= self.innovation_state.len() {
                    value += self.ma[j - 1] * self.innovation_state[self.innovation_state.len() - back];
                }
            }
            u.push(value);
        }

        u.split_off(offset)
    }

    /// Psi-веса MA(∞) представления
    fn psi_weights(&self, steps: usize) -> Vec<f64> {
        let mut psi = vec![0.0; steps.max(1)];
        psi[0] = 1.0;
        for j in 1..steps {
            let mut value = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=self.ar.len().min(j) {
                value += self.ar[i - 1] * psi[j - i];
            }
            psi[j] = value;
        }
        psi
    }
}

impl Forecaster for SarimaxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn exog_names(&self) -> &[String] {
        &self.exog_names
    }

    fn forecast(&self, X: &Array2<f64>) -> Result<ForecastResult, ModelError> {
        if X.ncols() != self.exog_coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.exog_coefficients.len(),
                actual: X.ncols(),
            });
        }

        let steps = X.nrows();
        let errors = Array1::from(self.error_path(steps));
        let mean = self.regression_mean(X) + &errors;

        let psi = self.psi_weights(steps);
        let mut cumulative = 0.0;
        let half_width: Array1<f64> = psi
            .iter()
            .take(steps)
            .map(|w| {
                cumulative += w * w;
                Z_95 * (self.sigma2 * cumulative).sqrt()
            })
            .collect();

        Ok(ForecastResult {
            lower: Some(&mean - &half_width),
            upper: Some(&mean + &half_width),
            mean,
            coverage: Some(NOMINAL_COVERAGE),
        })
    }
}

impl Artifact for SarimaxModel {
    const KIND: &'static str = "sarimax";

    fn validate(&self) -> Result<(), ModelError> {
        if self.exog_coefficients.len() != self.exog_names.len() {
            return Err(ModelError::InvalidModel(format!(
                "{} exogenous coefficients for {} exogenous names",
                self.exog_coefficients.len(),
                self.exog_names.len()
            )));
        }
        if self.residual_state.len() < self.ar.len() {
            return Err(ModelError::InvalidModel(format!(
                "AR order {} needs at least {} residuals of state",
                self.ar.len(),
                self.ar.len()
            )));
        }
        if self.innovation_state.len() < self.ma.len() {
            return Err(ModelError::InvalidModel(format!(
                "MA order {} needs at least {} innovations of state",
                self.ma.len(),
                self.ma.len()
            )));
        }
        if !self.sigma2.is_finite() || self.sigma2 < 0.0 {
            return Err(ModelError::InvalidModel(format!(
                "sigma2 must be a non-negative number, got {}",
                self.sigma2
            )));
        }
        Ok(())
    }
}
