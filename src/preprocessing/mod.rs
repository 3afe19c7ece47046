/// Модуль подготовки признаков

pub mod aggregation;
pub mod feature_engineering;
pub mod frame;
pub mod scenario;
pub mod schema;

pub use aggregation::{aggregate_daily, aggregate_region, regions, AggregatedSeries, EXOG_COLUMNS, TARGET_COLUMN};
pub use feature_engineering::{FeatureEngineer, ForecastWindow, HorizonBounds};
pub use frame::FeatureFrame;
pub use scenario::{decode_category, encode_scenario, EncodedScenario};
pub use schema::{CategoricalField, DerivedField, NumericField, NumericKind, ScenarioSchema};
