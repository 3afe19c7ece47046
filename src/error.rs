//! Ошибки пайплайна прогнозирования

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ModelError;

#[derive(Debug, Error)]
pub enum DemandError {
    #[error("failed to load model artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("failed to load historical data {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("forecast horizon of {requested} days leaves no history ({available} rows available); reduce the horizon")]
    InsufficientHistory { requested: usize, available: usize },

    #[error("features do not match the trained schema (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    FeatureSchema {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model inference failed: {0}")]
    Forecast(#[source] ModelError),
}

impl DemandError {
    /// Короткое имя варианта для ответа API
    pub fn kind(&self) -> &'static str {
        match self {
            DemandError::ArtifactLoad { .. } => "artifact_load",
            DemandError::DataLoad { .. } => "data_load",
            DemandError::InsufficientHistory { .. } => "insufficient_history",
            DemandError::FeatureSchema { .. } => "feature_schema",
            DemandError::InvalidInput(_) => "invalid_input",
            DemandError::Forecast(_) => "forecast",
        }
    }

    /// Можно ли исправить ошибку, поменяв ввод
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            DemandError::ArtifactLoad { .. } | DemandError::DataLoad { .. }
        )
    }
}

impl From<ModelError> for DemandError {
    fn from(err: ModelError) -> Self {
        DemandError::Forecast(err)
    }
}

pub type Result<T> = std::result::Result<T, DemandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = DemandError::FeatureSchema {
            missing: vec!["Region_North".to_string()],
            unexpected: vec!["Region_Central".to_string(), "Foo".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("missing: [Region_North]"));
        assert!(message.contains("unexpected: [Region_Central, Foo]"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_errors_are_fatal() {
        let err = DemandError::ArtifactLoad {
            path: PathBuf::from("models/sarimax.json"),
            reason: "not found".to_string(),
        };
        assert_eq!(err.kind(), "artifact_load");
        assert!(!err.is_recoverable());
    }
}
