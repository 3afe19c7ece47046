//! Единая граница ошибок для всех приложений

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::error;

use crate::error::Result;

/// Результат одного взаимодействия пользователя
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Success {
        value: T,
    },
    Failure {
        kind: String,
        message: String,
        recoverable: bool,
    },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value } => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(kind),
        }
    }
}

/// Запускает пайплайн приложения; ошибка или паника превращаются в `Outcome::Failure`
pub fn run_guarded<T, F>(app: &str, pipeline: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(Ok(value)) => Outcome::Success { value },
        Ok(Err(err)) => {
            error!(app, kind = err.kind(), error = %err, "Pipeline failed");
            Outcome::Failure {
                kind: err.kind().to_string(),
                message: err.to_string(),
                recoverable: err.is_recoverable(),
            }
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(app, panic = %message, "Pipeline panicked");
            Outcome::Failure {
                kind: "internal".to_string(),
                message,
                recoverable: false,
            }
        }
    }
}
