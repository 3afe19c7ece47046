//! Подготовка окна прогноза из дневного ряда

#![allow(non_snake_case)]

use chrono::NaiveDate;
use ndarray::{s, Array1};

use super::aggregation::AggregatedSeries;
use super::frame::FeatureFrame;
use crate::error::{DemandError, Result};
use crate::types::ExogOverride;

/// Допустимый диапазон горизонта прогноза (включительно)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for HorizonBounds {
    fn default() -> Self {
        Self { min: 7, max: 60 }
    }
}

/// Хвост ряда длиной `horizon`: факт для сравнения и регрессоры для модели
#[derive(Debug, Clone)]
pub struct ForecastWindow {
    pub dates: Vec<NaiveDate>,
    pub actual: Array1<f64>,
    pub exog: FeatureFrame,
    /// Сколько строк истории осталось перед окном
    pub context_len: usize,
}

impl ForecastWindow {
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Отрезает последние `horizon` строк ряда.
    /// Если перед окном не остается истории - `InsufficientHistory`.
    pub fn slice_forecast_window(
        series: &AggregatedSeries,
        horizon: usize,
        bounds: HorizonBounds,
        exog_override: Option<&ExogOverride>,
    ) -> Result<ForecastWindow> {
        if horizon < bounds.min || horizon > bounds.max {
            return Err(DemandError::InvalidInput(format!(
                "forecast horizon must be between {} and {} days, got {}",
                bounds.min, bounds.max, horizon
            )));
        }

        let available = series.len();
        if horizon >= available {
            return Err(DemandError::InsufficientHistory {
                requested: horizon,
                available,
            });
        }

        let split_idx = available - horizon;
        let X_test = series.exog.values().slice(s![split_idx.., ..]).to_owned();
        let mut exog = FeatureFrame::new(series.exog.columns().to_vec(), X_test)?;

        if let Some(over) = exog_override {
            exog.fill_column(&over.column, over.value)?;
            tracing::debug!(column = %over.column, value = over.value, "Exogenous override applied");
        }

        Ok(ForecastWindow {
            dates: series.dates[split_idx..].to_vec(),
            actual: series.target.slice(s![split_idx..]).to_owned(),
            exog,
            context_len: split_idx,
        })
    }
}
