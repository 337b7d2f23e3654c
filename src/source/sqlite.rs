//! SQLite record source reading the `flow_runs` table.

use std::path::Path;

use anyhow::Result;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use tracing::debug;

use super::{RecordSource, SourceError};
use crate::records::ExecutionRecord;
use crate::storage::{self, Pool};

pub struct SqliteSource {
    pool: Pool,
    label: String,
}

impl SqliteSource {
    pub fn open(path: &Path) -> Result<Self> {
        let label = path.display().to_string();
        let pool = storage::open_pool(&label)?;
        Ok(Self { pool, label })
    }

    pub fn new(pool: Pool, label: &str) -> Self {
        Self {
            pool,
            label: label.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for SqliteSource {
    async fn fetch(&self) -> Result<Vec<ExecutionRecord>, SourceError> {
        let pool = self.pool.clone();

        let records = tokio::task::spawn_blocking(move || -> Result<Vec<ExecutionRecord>, SourceError> {
            let conn = pool.get()?;
            load_records(&conn)
        })
        .await??;

        debug!(db = %self.label, records = records.len(), "read records from SQLite");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("sqlite {}", self.label)
    }
}

/// Read every flow run in insertion order.
pub fn load_records(conn: &rusqlite::Connection) -> Result<Vec<ExecutionRecord>, SourceError> {
    let mut stmt = conn.prepare(
        "SELECT flowname, flowowner, taskstatus, datetimestarted, datetimecompleted,
                triggertype, wassuccessful
         FROM flow_runs
         ORDER BY id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ExecutionRecord {
            flow_name: as_text(row.get(0)?),
            owner: as_text(row.get(1)?),
            status: as_text(row.get(2)?),
            started_at: as_text(row.get(3)?),
            completed_at: as_text(row.get(4)?),
            trigger_type: as_text(row.get(5)?),
            was_successful: as_flag(row.get(6)?),
        })
    })?;

    let mut records = Vec::new();
    for r in rows {
        records.push(r?);
    }
    Ok(records)
}

fn as_text(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Text(s) => Some(s),
        SqlValue::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn as_flag(value: SqlValue) -> Option<Value> {
    match value {
        SqlValue::Null => None,
        SqlValue::Integer(i) => Some(Value::from(i)),
        SqlValue::Real(f) => serde_json::Number::from_f64(f).map(Value::Number),
        SqlValue::Text(s) => Some(Value::String(s)),
        SqlValue::Blob(_) => None,
    }
}
