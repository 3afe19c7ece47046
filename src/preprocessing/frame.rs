//! Таблица признаков с именованными столбцами

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{DemandError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureFrame {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(DemandError::InvalidInput(format!(
                "{} column names for {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<f64>> {
        self.column_index(name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }

    /// Записывает одно значение во все строки столбца
    pub fn fill_column(&mut self, name: &str, value: f64) -> Result<()> {
        let idx = self.column_index(name).ok_or_else(|| DemandError::FeatureSchema {
            missing: vec![name.to_string()],
            unexpected: Vec::new(),
        })?;
        self.values.index_axis_mut(Axis(1), idx).fill(value);
        Ok(())
    }

    /// Приводит таблицу к схеме модели: те же имена, порядок модели.
    /// Любое расхождение в наборе столбцов - ошибка схемы.
    pub fn align_to(&self, expected: &[String]) -> Result<FeatureFrame> {
        let missing: Vec<String> = expected
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .cloned()
            .collect();
        let unexpected: Vec<String> = self
            .columns
            .iter()
            .filter(|name| !expected.contains(name))
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(DemandError::FeatureSchema { missing, unexpected });
        }

        let order: Vec<usize> = expected
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        Ok(FeatureFrame {
            columns: expected.to_vec(),
            values: self.values.select(Axis(1), &order),
        })
    }

    /// Строка в виде имя -> значение
    pub fn row_map(&self, row: usize) -> BTreeMap<String, f64> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.row(row).iter().copied())
            .collect()
    }
}
