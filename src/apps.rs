//! Четыре приложения прогноза спроса: загрузка -> сбор -> выравнивание -> прогноз -> вывод

use std::collections::BTreeMap;

use tracing::info;

use crate::config::AppConfig;
use crate::data::load_history;
use crate::error::{DemandError, Result};
use crate::models::{
    invoke_forecast, invoke_point, ArtifactCache, GradientBoostedModel, LinearRegressionModel,
    Regressor, SarimaxModel,
};
use crate::preprocessing::{
    aggregate_daily, aggregate_region, encode_scenario, regions, FeatureEngineer, NumericKind,
    ScenarioSchema,
};
use crate::presentation::{forecast_report, prediction_report, ForecastPresentation};
use crate::types::{
    ControlsOutput, ExogOverride, ForecastReport, NumberControl, PredictionReport, ScenarioInput,
    SelectControl, SliderControl,
};

pub struct DemandApps {
    config: AppConfig,
    schema: ScenarioSchema,
    sarimax: ArtifactCache<SarimaxModel>,
    linear: ArtifactCache<LinearRegressionModel>,
    xgboost: ArtifactCache<GradientBoostedModel>,
}

impl DemandApps {
    pub fn new(config: AppConfig) -> Result<Self> {
        let schema = match &config.artifacts.schema_path {
            Some(path) => ScenarioSchema::from_json_file(path)?,
            None => ScenarioSchema::retail_v1(),
        };
        Ok(Self::with_schema(config, schema))
    }

    pub fn with_schema(config: AppConfig, mut schema: ScenarioSchema) -> Self {
        // Значение слайдера скидки по умолчанию задается конфигурацией
        if let Some(discount) = schema
            .numeric
            .iter_mut()
            .find(|f| f.name == "Discount" && f.kind == NumericKind::Percent)
        {
            discount.default = config.controls.discount_default;
        }

        Self {
            config,
            schema,
            sarimax: ArtifactCache::new(),
            linear: ArtifactCache::new(),
            xgboost: ArtifactCache::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn schema(&self) -> &ScenarioSchema {
        &self.schema
    }

    /// Прогноз общего дневного ряда на последние `n_days` дней
    pub fn forecast(&self, n_days: Option<usize>) -> Result<ForecastReport> {
        let horizon = n_days.unwrap_or(self.config.controls.horizon_default);
        info!(app = "forecast", horizon, "Forecast request");

        let model = self.sarimax.get_or_load(&self.config.artifacts.sarimax_path)?;
        let records = load_history(&self.config.data.history_path)?;
        let series = aggregate_daily(&records)?;

        let window = FeatureEngineer::slice_forecast_window(
            &series,
            horizon,
            self.config.controls.horizon_bounds(),
            None,
        )?;
        let result = invoke_forecast(model.as_ref(), &window)?;

        forecast_report(ForecastPresentation {
            title: "Forecast vs Actual",
            region: None,
            window: &window,
            result: &result,
            show_band: false,
            discount_override: None,
        })
    }

    /// Прогноз по региону со сценарием скидки и 95% интервалом
    pub fn regional_forecast(
        &self,
        region: &str,
        n_days: Option<usize>,
        discount: Option<f64>,
    ) -> Result<ForecastReport> {
        let horizon = n_days.unwrap_or(self.config.controls.horizon_default);
        info!(app = "regional", region, horizon, ?discount, "Regional forecast request");

        if let Some(discount) = discount {
            if !(0.0..=100.0).contains(&discount) {
                return Err(DemandError::InvalidInput(format!(
                    "discount must be between 0 and 100 percent, got {discount}"
                )));
            }
        }

        let model = self
            .sarimax
            .get_or_load(&self.config.artifacts.regional_sarimax_path)?;
        let records = load_history(&self.config.data.history_path)?;

        let known = regions(&records);
        if !known.iter().any(|r| r == region) {
            return Err(DemandError::InvalidInput(format!(
                "unknown region '{}', expected one of: {}",
                region,
                known.join(", ")
            )));
        }
        let series = aggregate_region(&records, region)?;

        let exog_override = discount.map(|value| ExogOverride {
            column: "Discount".to_string(),
            value,
        });
        let window = FeatureEngineer::slice_forecast_window(
            &series,
            horizon,
            self.config.controls.horizon_bounds(),
            exog_override.as_ref(),
        )?;
        let result = invoke_forecast(model.as_ref(), &window)?;

        let title = match discount {
            Some(discount) => format!("{region}: Forecast with {discount}% Discount"),
            None => format!("{region}: Forecast vs Actual"),
        };
        forecast_report(ForecastPresentation {
            title: &title,
            region: Some(region),
            window: &window,
            result: &result,
            show_band: true,
            discount_override: discount,
        })
    }

    pub fn predict_linear(&self, input: &ScenarioInput) -> Result<PredictionReport> {
        let model = self.linear.get_or_load(&self.config.artifacts.linear_path)?;
        self.predict_point("linear", model.as_ref(), input)
    }

    pub fn predict_xgboost(&self, input: &ScenarioInput) -> Result<PredictionReport> {
        let model = self.xgboost.get_or_load(&self.config.artifacts.xgboost_path)?;
        self.predict_point("xgboost", model.as_ref(), input)
    }

    fn predict_point<R: Regressor + ?Sized>(
        &self,
        app: &str,
        model: &R,
        input: &ScenarioInput,
    ) -> Result<PredictionReport> {
        info!(app, fields = input.values.len(), "Point prediction request");

        let encoded = encode_scenario(&self.schema, input)?;
        let units_sold = invoke_point(model, &encoded.frame)?;

        info!(app, units_sold, "Point prediction done");
        Ok(prediction_report(model.name(), units_sold, &encoded))
    }

    /// Регионы, присутствующие в истории
    pub fn regions(&self) -> Result<Vec<String>> {
        let records = load_history(&self.config.data.history_path)?;
        Ok(regions(&records))
    }

    /// Описание элементов управления для клиента
    pub fn controls(&self) -> ControlsOutput {
        let controls = &self.config.controls;

        let mut sliders = BTreeMap::new();
        sliders.insert(
            "n_days".to_string(),
            SliderControl {
                label: "Select number of days to forecast:".to_string(),
                min: controls.horizon_min as f64,
                max: controls.horizon_max as f64,
                default: controls.horizon_default as f64,
            },
        );

        let mut numbers = BTreeMap::new();
        let mut selects = BTreeMap::new();
        for field in &self.schema.numeric {
            match field.kind {
                NumericKind::Percent => {
                    sliders.insert(
                        field.name.clone(),
                        SliderControl {
                            label: field.label.clone(),
                            min: field.min.unwrap_or(0.0),
                            max: field.max.unwrap_or(100.0),
                            default: field.default,
                        },
                    );
                }
                NumericKind::Number => {
                    numbers.insert(
                        field.name.clone(),
                        NumberControl {
                            label: field.label.clone(),
                            default: field.default,
                        },
                    );
                }
                NumericKind::Flag => {
                    let default = if field.default != 0.0 { "Yes" } else { "No" };
                    selects.insert(
                        field.name.clone(),
                        SelectControl {
                            label: field.label.clone(),
                            options: vec!["No".to_string(), "Yes".to_string()],
                            default: default.to_string(),
                        },
                    );
                }
            }
        }
        for field in &self.schema.categorical {
            selects.insert(
                field.name.clone(),
                SelectControl {
                    label: field.label.clone(),
                    options: field.options.clone(),
                    default: field.default.clone(),
                },
            );
        }

        ControlsOutput {
            schema_version: self.schema.version.clone(),
            sliders,
            numbers,
            selects,
        }
    }
}
