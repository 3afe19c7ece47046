//! Кодирование пользовательского сценария в строку признаков

use std::collections::BTreeMap;

use ndarray::Array2;
use tracing::warn;

use super::frame::FeatureFrame;
use super::schema::{CategoricalField, DerivedField, NumericField, NumericKind, ScenarioSchema};
use crate::error::{DemandError, Result};
use crate::types::{ScenarioInput, ScenarioValue};

/// Закодированный сценарий: одна строка признаков и список подмен на базовую категорию
#[derive(Debug, Clone)]
pub struct EncodedScenario {
    pub frame: FeatureFrame,
    pub fallbacks: Vec<String>,
}

pub fn encode_scenario(schema: &ScenarioSchema, input: &ScenarioInput) -> Result<EncodedScenario> {
    let unknown: Vec<&str> = input
        .values
        .keys()
        .filter(|key| {
            schema.numeric_field(key).is_none() && schema.categorical_field(key).is_none()
        })
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(DemandError::InvalidInput(format!(
            "unknown scenario fields: {}",
            unknown.join(", ")
        )));
    }

    let mut columns = Vec::new();
    let mut values = Vec::new();

    // Числовые поля
    let mut numeric: BTreeMap<&str, f64> = BTreeMap::new();
    for field in &schema.numeric {
        let value = numeric_value(field, input.get(&field.name))?;
        numeric.insert(field.column.as_str(), value);
        columns.push(field.column.clone());
        values.push(value);
    }

    // Производные признаки
    for derived in &schema.derived {
        let value = match derived {
            DerivedField::PriceAfterDiscount { price, discount, .. } => {
                let price = numeric.get(price.as_str()).copied().unwrap_or(0.0);
                let discount = numeric.get(discount.as_str()).copied().unwrap_or(0.0);
                price * (1.0 - discount)
            }
            DerivedField::Copy { source, .. } => {
                numeric.get(source.as_str()).copied().unwrap_or(0.0)
            }
        };
        columns.push(derived.column().to_string());
        values.push(value);
    }

    // One-hot кодирование без базовой категории
    let mut fallbacks = Vec::new();
    for field in &schema.categorical {
        let selected = categorical_value(field, input.get(&field.name))?;
        if !field.is_known(&selected) {
            warn!(
                field = %field.name,
                value = %selected,
                baseline = %field.baseline,
                "Unknown category, encoding as baseline"
            );
            fallbacks.push(format!(
                "{}: '{}' is not a known category, treated as baseline '{}'",
                field.name, selected, field.baseline
            ));
        }
        for category in field.encoded_categories() {
            columns.push(field.indicator_column(category));
            values.push(if *category == selected { 1.0 } else { 0.0 });
        }
    }

    let n_features = values.len();
    let values = Array2::from_shape_vec((1, n_features), values)
        .map_err(|e| DemandError::InvalidInput(e.to_string()))?;

    Ok(EncodedScenario {
        frame: FeatureFrame::new(columns, values)?,
        fallbacks,
    })
}

fn numeric_value(field: &NumericField, value: Option<&ScenarioValue>) -> Result<f64> {
    let invalid = |what: String| DemandError::InvalidInput(format!("{}: {}", field.name, what));

    let raw = match (field.kind, value) {
        (_, None) => field.default,
        (NumericKind::Flag, Some(ScenarioValue::Flag(flag))) => f64::from(u8::from(*flag)),
        (NumericKind::Flag, Some(ScenarioValue::Text(text))) => match text.as_str() {
            "Yes" | "yes" => 1.0,
            "No" | "no" => 0.0,
            other => return Err(invalid(format!("expected Yes or No, got '{other}'"))),
        },
        (NumericKind::Flag, Some(ScenarioValue::Number(n))) => {
            if *n != 0.0 && *n != 1.0 {
                return Err(invalid(format!("expected 0 or 1, got {n}")));
            }
            *n
        }
        (_, Some(ScenarioValue::Number(n))) => *n,
        (_, Some(other)) => return Err(invalid(format!("expected a number, got {other:?}"))),
    };

    if !raw.is_finite() {
        return Err(invalid("value must be finite".to_string()));
    }
    if let Some(min) = field.min {
        if raw < min {
            return Err(invalid(format!("{raw} is below the minimum {min}")));
        }
    }
    if let Some(max) = field.max {
        if raw > max {
            return Err(invalid(format!("{raw} is above the maximum {max}")));
        }
    }

    Ok(match field.kind {
        NumericKind::Percent => raw / 100.0,
        NumericKind::Number | NumericKind::Flag => raw,
    })
}

fn categorical_value(field: &CategoricalField, value: Option<&ScenarioValue>) -> Result<String> {
    match value {
        None => Ok(field.default.clone()),
        Some(ScenarioValue::Text(text)) => Ok(text.clone()),
        Some(other) => Err(DemandError::InvalidInput(format!(
            "{}: expected a category name, got {:?}",
            field.name, other
        ))),
    }
}

/// Восстанавливает выбранную категорию по индикаторам; все нули - базовая категория
pub fn decode_category(field: &CategoricalField, row: &BTreeMap<String, f64>) -> Result<String> {
    let active: Vec<&String> = field
        .encoded_categories()
        .filter(|category| {
            row.get(&field.indicator_column(category))
                .is_some_and(|value| *value != 0.0)
        })
        .collect();

    match active.as_slice() {
        [] => Ok(field.baseline.clone()),
        [category] => Ok((*category).clone()),
        _ => Err(DemandError::InvalidInput(format!(
            "{} has {} active indicators",
            field.name,
            active.len()
        ))),
    }
}
