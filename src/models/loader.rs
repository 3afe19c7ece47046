//! Загрузка артефактов моделей с диска

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::ModelError;
use crate::error::{DemandError, Result};

/// Сериализованная модель, которую можно загрузить из JSON
pub trait Artifact: DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;

    /// Проверка внутренней согласованности после десериализации
    fn validate(&self) -> std::result::Result<(), ModelError>;
}

pub fn load_artifact<M: Artifact>(path: &Path) -> Result<M> {
    info!(kind = M::KIND, path = %path.display(), "Loading model artifact");

    let artifact_error = |reason: String| DemandError::ArtifactLoad {
        path: path.to_path_buf(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| artifact_error(e.to_string()))?;
    let model: M = serde_json::from_str(&raw).map_err(|e| artifact_error(e.to_string()))?;
    model.validate().map_err(|e| artifact_error(e.to_string()))?;

    info!(kind = M::KIND, path = %path.display(), "Model artifact loaded");
    Ok(model)
}

/// Кэш загруженных моделей на процесс, ключ - путь к файлу.
/// Артефакты статичны, поэтому инвалидации нет.
pub struct ArtifactCache<M> {
    entries: RwLock<HashMap<PathBuf, Arc<M>>>,
}

impl<M: Artifact> ArtifactCache<M> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_load(&self, path: &Path) -> Result<Arc<M>> {
        if let Some(model) = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(path).cloned())
        {
            debug!(kind = M::KIND, path = %path.display(), "Model artifact cache hit");
            return Ok(model);
        }

        let model = Arc::new(load_artifact::<M>(path)?);
        if let Ok(mut entries) = self.entries.write() {
            // Другой запрос мог загрузить модель раньше - берем его экземпляр
            let cached = entries
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::clone(&model));
            return Ok(Arc::clone(cached));
        }
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M: Artifact> Default for ArtifactCache<M> {
    fn default() -> Self {
        Self::new()
    }
}
