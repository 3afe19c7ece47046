//! Метрики точности прогноза

use ndarray::ArrayView1;

use crate::error::{DemandError, Result};
use crate::types::AccuracyMetrics;

fn paired_errors<'a>(
    actual: &'a [f64],
    forecast: &'a [f64],
) -> Result<impl Iterator<Item = f64> + 'a> {
    if actual.len() != forecast.len() {
        return Err(DemandError::InvalidInput(format!(
            "actual and forecast lengths differ ({} vs {})",
            actual.len(),
            forecast.len()
        )));
    }
    if actual.is_empty() {
        return Err(DemandError::InvalidInput(
            "cannot score an empty forecast".to_string(),
        ));
    }
    Ok(actual.iter().zip(forecast).map(|(a, f)| a - f))
}

pub fn mean_absolute_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    let n = actual.len() as f64;
    Ok(paired_errors(actual, forecast)?.map(f64::abs).sum::<f64>() / n)
}

pub fn root_mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    let n = actual.len() as f64;
    let mse = paired_errors(actual, forecast)?.map(|e| e * e).sum::<f64>() / n;
    Ok(mse.sqrt())
}

/// MAPE в процентах; точки с нулевым фактом пропускаются
pub fn mean_absolute_percentage_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    let _ = paired_errors(actual, forecast)?;
    let (sum, count) = actual
        .iter()
        .zip(forecast)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, f)| {
            (sum + ((a - f) / a).abs(), count + 1)
        });

    if count == 0 {
        return Err(DemandError::InvalidInput(
            "all actual values are zero".to_string(),
        ));
    }
    Ok(sum / count as f64 * 100.0)
}

pub fn accuracy(actual: ArrayView1<f64>, forecast: ArrayView1<f64>) -> Result<AccuracyMetrics> {
    let actual = actual.to_vec();
    let forecast = forecast.to_vec();
    let mae = mean_absolute_error(&actual, &forecast)?;
    let rmse = root_mean_squared_error(&actual, &forecast)?;
    let mape = if actual.iter().any(|a| *a != 0.0) {
        Some(mean_absolute_percentage_error(&actual, &forecast)?)
    } else {
        None
    };
    Ok(AccuracyMetrics { mae, rmse, mape })
}
