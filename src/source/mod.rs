//! Record sources: where execution records come from before the pipeline runs.

pub mod dates;
pub mod json;
pub mod mapping;
pub mod sqlite;

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::config::{SourceConfig, SourceKind};
use crate::records::ExecutionRecord;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("record loading task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Trait for anything that can hand over a snapshot of execution records.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the full current snapshot.
    async fn fetch(&self) -> Result<Vec<ExecutionRecord>, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// A fixed, in-memory set of records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<ExecutionRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<ExecutionRecord>) -> Self {
        Self { records }
    }
}

#[async_trait::async_trait]
impl RecordSource for MemorySource {
    async fn fetch(&self) -> Result<Vec<ExecutionRecord>, SourceError> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

/// Open the record source selected in the configuration.
pub fn from_config(config: &SourceConfig) -> Result<Arc<dyn RecordSource>> {
    let source: Arc<dyn RecordSource> = match config.kind {
        SourceKind::Sqlite => Arc::new(sqlite::SqliteSource::open(&config.path)?),
        SourceKind::Json => Arc::new(json::JsonFileSource::new(&config.path)),
    };
    tracing::info!(source = %source.describe(), "record source ready");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_returns_snapshot() {
        let source = MemorySource::new(vec![ExecutionRecord::new(
            "Flow",
            "owner",
            "Failed",
            "2024-05-01 10:00:00",
        )]);
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.describe(), "memory (1 records)");
    }

    #[tokio::test]
    async fn test_from_config_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("runs.json");
        std::fs::write(&path, "[]").unwrap();

        let config = SourceConfig {
            kind: SourceKind::Json,
            path: path.clone(),
        };
        let source = from_config(&config).unwrap();
        assert!(source.fetch().await.unwrap().is_empty());
        assert!(source.describe().contains("runs.json"));
    }
}
