/// Типы данных для приложений прогнозирования спроса

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Строка исходного (предобработанного) датасета магазина
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Store ID", default)]
    pub store_id: Option<String>,
    #[serde(rename = "Product ID", default)]
    pub product_id: Option<String>,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Units Sold")]
    pub units_sold: f64,
    #[serde(rename = "Inventory Level")]
    pub inventory_level: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Discount")]
    pub discount: f64, // проценты, 0-100
    #[serde(rename = "Weather Condition")]
    pub weather_condition: f64, // код метки
    #[serde(rename = "Holiday/Promotion")]
    pub holiday_promotion: f64, // 0 | 1
    #[serde(rename = "Competitor Pricing")]
    pub competitor_pricing: f64,
    #[serde(rename = "Seasonality")]
    pub seasonality: f64, // код метки
}

/// Значение, введенное пользователем в поле сценария
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for ScenarioValue {
    fn from(value: f64) -> Self {
        ScenarioValue::Number(value)
    }
}

impl From<bool> for ScenarioValue {
    fn from(value: bool) -> Self {
        ScenarioValue::Flag(value)
    }
}

impl From<&str> for ScenarioValue {
    fn from(value: &str) -> Self {
        ScenarioValue::Text(value.to_string())
    }
}

/// Сценарий "что если" для точечного прогноза: имя поля -> значение.
/// Незаполненные поля берут значения по умолчанию из схемы.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioInput {
    pub values: BTreeMap<String, ScenarioValue>,
}

impl ScenarioInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<ScenarioValue>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&ScenarioValue> {
        self.values.get(field)
    }
}

/// Подмена одного экзогенного столбца на всем окне прогноза
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogOverride {
    pub column: String,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastQuery {
    pub n_days: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionalQuery {
    pub region: String,
    pub n_days: Option<usize>,
    pub discount: Option<f64>, // проценты, 0-100
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Нет значения, если весь факт нулевой
    #[serde(default)]
    pub mape: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub title: String,
    pub region: Option<String>,
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub forecast: Vec<f64>,
    pub lower: Option<Vec<f64>>,
    pub upper: Option<Vec<f64>>,
    pub coverage: Option<f64>,
    pub context_len: usize,
    pub discount_override: Option<f64>,
    pub metrics: AccuracyMetrics,
    pub caption: String,
    pub metric_lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub model: String,
    pub units_sold: f64,
    pub message: String,
    pub features: BTreeMap<String, f64>,
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliderControl {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberControl {
    pub label: String,
    pub default: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectControl {
    pub label: String,
    pub options: Vec<String>,
    pub default: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsOutput {
    pub schema_version: String,
    pub sliders: BTreeMap<String, SliderControl>,
    pub numbers: BTreeMap<String, NumberControl>,
    pub selects: BTreeMap<String, SelectControl>,
}
