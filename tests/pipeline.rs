//! End-to-end pipeline tests: SQLite source → normalize → matrix / summary.

use botwatch::dashboard::{assemble, DashboardQuery};
use botwatch::matrix::{build_matrix, Selection};
use botwatch::records::{normalize, ExecutionRecord, NormalizeOptions, NO_RUN};
use botwatch::source::mapping::{FlowInfo, FlowMapping};
use botwatch::source::sqlite::SqliteSource;
use botwatch::source::RecordSource;
use botwatch::storage;
use rusqlite::params;
use tempfile::TempDir;

fn seed(pool: &storage::Pool, rows: &[(&str, &str, &str, &str, i64)]) {
    let conn = pool.get().unwrap();
    for (flow, owner, status, started, ok) in rows {
        conn.execute(
            "INSERT INTO flow_runs (flowname, flowowner, taskstatus, datetimestarted, wassuccessful)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![flow, owner, status, started, ok],
        )
        .unwrap();
    }
}

#[tokio::test]
async fn test_sqlite_to_matrix() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("runs.db");
    let pool = storage::open_pool(db.to_str().unwrap()).unwrap();
    seed(
        &pool,
        &[
            ("Pay", "ops serviceaccount", "Succeeded", "2024-05-01 08:00:00", 1),
            ("Pay", "ops serviceaccount", "Failed", "2024-05-01 08:45:00", 0),
            ("Ship", "ops serviceaccount", "Running", "2024-05-01 09:10:00", 0),
            ("Ship", "ops serviceaccount", "Succeeded", "2024-04-30 09:10:00", 1),
        ],
    );

    let source = SqliteSource::new(pool, "test");
    let raw = source.fetch().await.unwrap();
    assert_eq!(raw.len(), 4);

    let mapping = FlowMapping::from_iter([("Pay".to_string(), FlowInfo::new("Billing"))]);
    let view = assemble(&raw, &mapping, NormalizeOptions::default(), &DashboardQuery::default());

    assert_eq!(view.matrix.hours, (0..24).collect::<Vec<u8>>());
    assert_eq!(view.matrix.keys[0], "Ops | Billing | Pay");
    assert_eq!(view.matrix.status_at("Ops | Billing | Pay", 8), Some("Failed"));
    assert_eq!(view.matrix.status_at("Ops | Other Cloud Flow | Ship", 9), Some("Running"));
    assert_eq!(view.matrix.status_at("Ops | Billing | Pay", 9), Some(NO_RUN));

    let summary = view.summary();
    assert_eq!(summary.performance.total_executions, 3);
    assert_eq!(summary.project_metrics.len(), 2);
}

#[test]
fn test_cap_and_idempotence_over_many_bots() {
    let mut raw = Vec::new();
    for i in 0..400 {
        let status = if i % 97 == 0 { "Failed" } else { "Succeeded" };
        raw.push(ExecutionRecord::new(
            &format!("Bot {:03}", i),
            "ops",
            status,
            &format!("2024-05-01 {:02}:00:00", i % 24),
        ));
    }
    let records = normalize(&raw, None, NormalizeOptions::default()).records;

    let first = build_matrix(&records, &Selection::All, &Selection::All, 300);
    let second = build_matrix(&records, &Selection::All, &Selection::All, 300);
    assert_eq!(first, second);
    assert_eq!(first.keys.len(), 300);
    assert_eq!(first.matrix.len(), 300);
    assert!(first.matrix.values().all(|row| row.len() == 24));

    // The five failing bots (0, 97, 194, 291, 388) lead the ranking.
    for key in &first.keys[..5] {
        assert!(first.matrix[key].values().any(|s| s == "Failed"), "{key} should have failed");
    }
}
