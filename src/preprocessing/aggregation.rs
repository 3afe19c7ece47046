//! Агрегация исходных записей в дневные ряды

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{Array1, Array2};

use super::frame::FeatureFrame;
use crate::error::Result;
use crate::types::RawRecord;

pub const TARGET_COLUMN: &str = "Units Sold";

/// Экзогенные столбцы в порядке, в котором их видела модель при обучении
pub const EXOG_COLUMNS: [&str; 7] = [
    "Inventory Level",
    "Price",
    "Discount",
    "Weather Condition",
    "Holiday/Promotion",
    "Competitor Pricing",
    "Seasonality",
];

/// Дневной ряд: продажи суммируются, остальные признаки усредняются
#[derive(Debug, Clone)]
pub struct AggregatedSeries {
    pub region: Option<String>,
    pub dates: Vec<NaiveDate>,
    pub target: Array1<f64>,
    pub exog: FeatureFrame,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Default)]
struct DayAccumulator {
    units_sold: f64,
    sums: [f64; EXOG_COLUMNS.len()],
    count: usize,
}

impl DayAccumulator {
    fn push(&mut self, record: &RawRecord) {
        self.units_sold += record.units_sold;
        let values = [
            record.inventory_level,
            record.price,
            record.discount,
            record.weather_condition,
            record.holiday_promotion,
            record.competitor_pricing,
            record.seasonality,
        ];
        for (sum, value) in self.sums.iter_mut().zip(values) {
            *sum += value;
        }
        self.count += 1;
    }
}

fn build_series<'a>(
    region: Option<String>,
    records: impl Iterator<Item = &'a RawRecord>,
) -> Result<AggregatedSeries> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().push(record);
    }

    let n_days = days.len();
    let mut dates = Vec::with_capacity(n_days);
    let mut target = Array1::zeros(n_days);
    let mut exog = Array2::zeros((n_days, EXOG_COLUMNS.len()));

    for (i, (date, day)) in days.into_iter().enumerate() {
        dates.push(date);
        target[i] = day.units_sold;
        for (j, sum) in day.sums.iter().enumerate() {
            exog[[i, j]] = sum / day.count as f64;
        }
    }

    let columns = EXOG_COLUMNS.iter().map(|c| c.to_string()).collect();
    Ok(AggregatedSeries {
        region,
        dates,
        target,
        exog: FeatureFrame::new(columns, exog)?,
    })
}

/// Общий ряд по всем регионам
pub fn aggregate_daily(records: &[RawRecord]) -> Result<AggregatedSeries> {
    build_series(None, records.iter())
}

/// Ряд одного региона
pub fn aggregate_region(records: &[RawRecord], region: &str) -> Result<AggregatedSeries> {
    build_series(
        Some(region.to_string()),
        records.iter().filter(|r| r.region == region),
    )
}

/// Регионы, встречающиеся в данных, по алфавиту
pub fn regions(records: &[RawRecord]) -> Vec<String> {
    let mut regions: Vec<String> = records.iter().map(|r| r.region.clone()).collect();
    regions.sort();
    regions.dedup();
    regions
}
