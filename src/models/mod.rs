/// Обученные модели и их вызов

pub mod sarimax;
pub mod linear;
pub mod gradient_boosting;
pub mod loader;

pub use gradient_boosting::GradientBoostedModel;
pub use linear::LinearRegressionModel;
pub use loader::{load_artifact, Artifact, ArtifactCache};
pub use sarimax::SarimaxModel;

use ndarray::{Array1, Array2};
use thiserror::Error;

use crate::error::{DemandError, Result};
use crate::preprocessing::{FeatureFrame, ForecastWindow};

/// Номинальное покрытие доверительного интервала
pub const NOMINAL_COVERAGE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} feature columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("expected exactly one input row, got {0}")]
    RowCount(usize),

    #[error("model returned {actual} values for {expected} steps")]
    OutputLength { expected: usize, actual: usize },

    #[error("model produced a non-finite value at position {0}")]
    NonFinite(usize),

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Результат прогноза временного ряда
#[derive(Debug, Clone)]
pub struct ForecastResult {
    pub mean: Array1<f64>,
    pub lower: Option<Array1<f64>>,
    pub upper: Option<Array1<f64>>,
    pub coverage: Option<f64>,
}

/// Модель временного ряда с экзогенными регрессорами
pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    /// Экзогенные столбцы в порядке обучения
    fn exog_names(&self) -> &[String];

    /// Прогноз на `exog.nrows()` шагов вперед
    fn forecast(&self, exog: &Array2<f64>) -> std::result::Result<ForecastResult, ModelError>;
}

/// Регрессионная модель точечного прогноза
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;

    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &Array2<f64>) -> std::result::Result<Array1<f64>, ModelError>;
}

/// Вызов модели прогноза на окне: сверка схемы, прогноз, проверка формы результата
pub fn invoke_forecast<F: Forecaster + ?Sized>(
    model: &F,
    window: &ForecastWindow,
) -> Result<ForecastResult> {
    let exog = window.exog.align_to(model.exog_names())?;
    let steps = exog.nrows();

    let result = model.forecast(exog.values())?;
    if result.mean.len() != steps {
        return Err(ModelError::OutputLength {
            expected: steps,
            actual: result.mean.len(),
        }
        .into());
    }
    if let Some(pos) = result.mean.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite(pos).into());
    }

    tracing::debug!(model = model.name(), steps, "Forecast computed");
    Ok(result)
}

/// Вызов регрессора ровно на одной строке признаков
pub fn invoke_point<R: Regressor + ?Sized>(model: &R, frame: &FeatureFrame) -> Result<f64> {
    if frame.nrows() != 1 {
        return Err(DemandError::Forecast(ModelError::RowCount(frame.nrows())));
    }
    let aligned = frame.align_to(model.feature_names())?;

    let predictions = model.predict(aligned.values())?;
    if predictions.len() != 1 {
        return Err(ModelError::OutputLength {
            expected: 1,
            actual: predictions.len(),
        }
        .into());
    }
    let value = predictions[0];
    if !value.is_finite() {
        return Err(ModelError::NonFinite(0).into());
    }

    tracing::debug!(model = model.name(), value, "Point prediction computed");
    Ok(value)
}
