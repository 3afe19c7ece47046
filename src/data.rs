//! Загрузка исторических данных из CSV

use std::path::Path;

use crate::error::{DemandError, Result};
use crate::types::RawRecord;

pub fn load_history(path: &Path) -> Result<Vec<RawRecord>> {
    let data_error = |reason: String| DemandError::DataLoad {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| data_error(e.to_string()))?;

    let records = reader
        .deserialize::<RawRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| data_error(e.to_string()))?;

    tracing::debug!(path = %path.display(), rows = records.len(), "Historical data loaded");
    Ok(records)
}
