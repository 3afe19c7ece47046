//! Конфигурация сервиса

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::preprocessing::HorizonBounds;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub history_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("data/retail_store_inventory_preprocessed.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    pub sarimax_path: PathBuf,
    pub regional_sarimax_path: PathBuf,
    pub linear_path: PathBuf,
    pub xgboost_path: PathBuf,
    /// Схема признаков точечных моделей; без нее используется retail-v1
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            sarimax_path: PathBuf::from("models/sarimax_model.json"),
            regional_sarimax_path: PathBuf::from("models/sarimax_region_model.json"),
            linear_path: PathBuf::from("models/linear_model.json"),
            xgboost_path: PathBuf::from("models/xgb_model.json"),
            schema_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlsConfig {
    pub horizon_min: usize,
    pub horizon_max: usize,
    pub horizon_default: usize,
    pub discount_default: f64, // проценты
}

impl ControlsConfig {
    pub fn horizon_bounds(&self) -> HorizonBounds {
        HorizonBounds {
            min: self.horizon_min,
            max: self.horizon_max,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            horizon_min: 7,
            horizon_max: 60,
            horizon_default: 30,
            discount_default: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Уровень по умолчанию, RUST_LOG имеет приоритет
    pub level: String,
    /// pretty | compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Загрузка из config/demand.toml (если есть) и переменных DEMAND__*
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/demand.toml")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("DEMAND").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<()> {
        let controls = &self.controls;
        if controls.horizon_min == 0 || controls.horizon_min > controls.horizon_max {
            anyhow::bail!(
                "invalid horizon bounds [{}, {}]",
                controls.horizon_min,
                controls.horizon_max
            );
        }
        if !(controls.horizon_min..=controls.horizon_max).contains(&controls.horizon_default) {
            anyhow::bail!(
                "default horizon {} is outside [{}, {}]",
                controls.horizon_default,
                controls.horizon_min,
                controls.horizon_max
            );
        }
        if !(0.0..=100.0).contains(&controls.discount_default) {
            anyhow::bail!("default discount {} is outside [0, 100]", controls.discount_default);
        }
        Ok(())
    }
}
