//! Версионированная схема признаков для точечных моделей
//!
//! Списки категорий и базовые категории задаются данными, а не кодом:
//! схему можно загрузить из JSON вместе с моделью.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Number,
    /// Ввод 0-100, в модель уходит доля 0-1
    Percent,
    /// Да/нет, в модель уходит 0 или 1
    Flag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericField {
    pub name: String,
    pub column: String,
    pub label: String,
    pub kind: NumericKind,
    pub default: f64,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedField {
    /// price * (1 - discount), discount уже в долях
    PriceAfterDiscount {
        column: String,
        price: String,
        discount: String,
    },
    Copy {
        column: String,
        source: String,
    },
}

impl DerivedField {
    pub fn column(&self) -> &str {
        match self {
            DerivedField::PriceAfterDiscount { column, .. } => column,
            DerivedField::Copy { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalField {
    pub name: String,
    pub label: String,
    pub column_prefix: String,
    /// Категории в порядке индикаторных столбцов (включая базовую)
    pub categories: Vec<String>,
    /// Кодируется нулями во всех индикаторах
    pub baseline: String,
    /// Порядок вариантов в интерфейсе
    pub options: Vec<String>,
    pub default: String,
}

impl CategoricalField {
    pub fn indicator_column(&self, category: &str) -> String {
        format!("{}_{}", self.column_prefix, category)
    }

    /// Категории, для которых есть индикаторный столбец
    pub fn encoded_categories(&self) -> impl Iterator<Item = &String> {
        self.categories.iter().filter(move |c| **c != self.baseline)
    }

    pub fn indicator_columns(&self) -> Vec<String> {
        self.encoded_categories()
            .map(|c| self.indicator_column(c))
            .collect()
    }

    pub fn is_known(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSchema {
    pub version: String,
    pub numeric: Vec<NumericField>,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
    #[serde(default)]
    pub categorical: Vec<CategoricalField>,
}

impl ScenarioSchema {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let schema_error = |reason: String| DemandError::ArtifactLoad {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| schema_error(e.to_string()))?;
        let schema: ScenarioSchema =
            serde_json::from_str(&raw).map_err(|e| schema_error(e.to_string()))?;
        schema.validate().map_err(|e| schema_error(e.to_string()))?;
        tracing::info!(version = %schema.version, path = %path.display(), "Feature schema loaded");
        Ok(schema)
    }

    /// Все столбцы, которые производит кодировщик, в порядке схемы
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.numeric.iter().map(|f| f.column.clone()).collect();
        columns.extend(self.derived.iter().map(|d| d.column().to_string()));
        for field in &self.categorical {
            columns.extend(field.indicator_columns());
        }
        columns
    }

    pub fn numeric_field(&self, name: &str) -> Option<&NumericField> {
        self.numeric.iter().find(|f| f.name == name)
    }

    pub fn categorical_field(&self, name: &str) -> Option<&CategoricalField> {
        self.categorical.iter().find(|f| f.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        for field in &self.categorical {
            if !field.is_known(&field.baseline) {
                return Err(DemandError::InvalidInput(format!(
                    "baseline {} is not a category of {}",
                    field.baseline, field.name
                )));
            }
            if !field.options.iter().any(|o| *o == field.default) {
                return Err(DemandError::InvalidInput(format!(
                    "default {} is not an option of {}",
                    field.default, field.name
                )));
            }
            if let Some(option) = field.options.iter().find(|o| !field.is_known(o)) {
                return Err(DemandError::InvalidInput(format!(
                    "option {} is not a category of {}",
                    option, field.name
                )));
            }
        }

        for field in &self.numeric {
            let below = field.min.is_some_and(|min| field.default < min);
            let above = field.max.is_some_and(|max| field.default > max);
            if below || above {
                return Err(DemandError::InvalidInput(format!(
                    "default {} of {} is outside its bounds",
                    field.default, field.name
                )));
            }
        }

        let numeric_columns: Vec<&str> = self.numeric.iter().map(|f| f.column.as_str()).collect();
        for derived in &self.derived {
            let sources: Vec<&str> = match derived {
                DerivedField::PriceAfterDiscount { price, discount, .. } => {
                    vec![price.as_str(), discount.as_str()]
                }
                DerivedField::Copy { source, .. } => vec![source.as_str()],
            };
            if let Some(source) = sources.iter().find(|s| !numeric_columns.contains(*s)) {
                return Err(DemandError::InvalidInput(format!(
                    "derived column {} reads unknown column {}",
                    derived.column(),
                    source
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in self.columns() {
            if !seen.insert(column.clone()) {
                return Err(DemandError::InvalidInput(format!(
                    "duplicate feature column {column}"
                )));
            }
        }
        Ok(())
    }

    /// Схема признаков розничного датасета, на которой обучены точечные модели
    pub fn retail_v1() -> Self {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        fn numeric(name: &str, label: &str, kind: NumericKind, default: f64) -> NumericField {
            NumericField {
                name: name.to_string(),
                column: name.to_string(),
                label: label.to_string(),
                kind,
                default,
                min: None,
                max: None,
            }
        }

        Self {
            version: "retail-v1".to_string(),
            numeric: vec![
                numeric("Price", "Selling Price", NumericKind::Number, 30.0),
                NumericField {
                    min: Some(0.0),
                    max: Some(100.0),
                    ..numeric("Discount", "Discount (%)", NumericKind::Percent, 10.0)
                },
                numeric("Competitor Pricing", "Competitor Price", NumericKind::Number, 28.0),
                numeric(
                    "Holiday/Promotion",
                    "Is there a Holiday or Promotion?",
                    NumericKind::Flag,
                    0.0,
                ),
                numeric("Inventory Level", "Inventory Level", NumericKind::Number, 200.0),
            ],
            derived: vec![
                DerivedField::PriceAfterDiscount {
                    column: "Price_After_Discount".to_string(),
                    price: "Price".to_string(),
                    discount: "Discount".to_string(),
                },
                DerivedField::Copy {
                    column: "Is_Promo".to_string(),
                    source: "Holiday/Promotion".to_string(),
                },
            ],
            categorical: vec![
                CategoricalField {
                    name: "Category".to_string(),
                    label: "Product Category".to_string(),
                    column_prefix: "Category".to_string(),
                    categories: strings(&["Clothing", "Electronics", "Groceries", "Toys", "Other"]),
                    baseline: "Other".to_string(),
                    options: strings(&["Electronics", "Groceries", "Toys", "Clothing", "Other"]),
                    default: "Electronics".to_string(),
                },
                CategoricalField {
                    name: "Region".to_string(),
                    label: "Region".to_string(),
                    column_prefix: "Region".to_string(),
                    categories: strings(&["East", "North", "South", "West"]),
                    baseline: "East".to_string(),
                    options: strings(&["North", "South", "East", "West"]),
                    default: "North".to_string(),
                },
                CategoricalField {
                    name: "Seasonality".to_string(),
                    label: "Season".to_string(),
                    column_prefix: "Seasonality".to_string(),
                    categories: strings(&["Autumn", "Spring", "Summer", "Winter"]),
                    baseline: "Spring".to_string(),
                    options: strings(&["Winter", "Spring", "Summer", "Autumn"]),
                    default: "Winter".to_string(),
                },
                CategoricalField {
                    name: "Weather Condition".to_string(),
                    label: "Weather".to_string(),
                    column_prefix: "Weather Condition".to_string(),
                    categories: strings(&["Cloudy", "Rainy", "Snowy", "Sunny"]),
                    baseline: "Cloudy".to_string(),
                    options: strings(&["Sunny", "Rainy", "Cloudy", "Snowy"]),
                    default: "Sunny".to_string(),
                },
            ],
        }
    }
}

impl Default for ScenarioSchema {
    fn default() -> Self {
        Self::retail_v1()
    }
}
