//! JSON flat-file record source (an exported array of flow runs).

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{RecordSource, SourceError};
use crate::records::ExecutionRecord;

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

/// Parse a JSON array of execution records.
pub fn parse_records(json: &str) -> Result<Vec<ExecutionRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

#[async_trait::async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<ExecutionRecord>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let records = parse_records(&content).map_err(|source| SourceError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), records = records.len(), "read records from JSON file");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}
