//! Demand Forecast - приложения прогноза спроса поверх обученных моделей

pub mod apps;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod presentation;
pub mod server;
pub mod types;

pub use types::*;
pub use models::*;
pub use preprocessing::*;

// Re-export для удобства
pub use apps::DemandApps;
pub use error::{DemandError, Result};
pub use pipeline::{run_guarded, Outcome};
