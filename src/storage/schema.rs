//! Database schema for the flow-run table.
//!
//! Column names follow the flow-run export the dashboard reads from.

use anyhow::Result;
use rusqlite::Connection;

pub const FLOW_RUNS_TABLE: &str = "flow_runs";

/// Create the flow-run table and its indexes if they do not exist.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS flow_runs (
            id INTEGER PRIMARY KEY,
            flowname TEXT,
            flowowner TEXT,
            taskstatus TEXT,
            datetimestarted TEXT,
            datetimecompleted TEXT,
            triggertype TEXT,
            wassuccessful
        );

        CREATE INDEX IF NOT EXISTS idx_flow_runs_started ON flow_runs(datetimestarted);
        CREATE INDEX IF NOT EXISTS idx_flow_runs_flowname ON flow_runs(flowname);",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        migrate(&conn)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [FLOW_RUNS_TABLE],
            |row| row.get(0),
        )?;
        assert_eq!(count, 1);
        Ok(())
    }
}
