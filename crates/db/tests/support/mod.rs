#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use opsboard_db::Db;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    /// Direct connection for seeding rows the dashboard itself never
    /// writes (missions, events, repos come from external processes).
    pub raw: Connection,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ops.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    let raw = Connection::open(&path).expect("raw connection");
    TestDb {
        _dir: dir,
        db,
        raw,
        path,
    }
}

pub fn insert_repo(conn: &Connection, name: &str) -> i64 {
    conn.execute(
        "INSERT INTO repos (name, default_branch, created_at)
         VALUES (?1, 'main', '2026-01-01T00:00:00Z')",
        params![name],
    )
    .expect("insert repo");
    conn.last_insert_rowid()
}

pub fn insert_mission(conn: &Connection, title: &str, status: &str, project: &str) -> i64 {
    conn.execute(
        "INSERT INTO missions (title, status, project, created_at, updated_at)
         VALUES (?1, ?2, ?3, '2026-02-01T00:00:00Z', '2026-02-01T00:00:00Z')",
        params![title, status, project],
    )
    .expect("insert mission");
    conn.last_insert_rowid()
}

pub fn insert_event(conn: &Connection, timestamp: &str, category: &str, event: &str) -> i64 {
    conn.execute(
        "INSERT INTO ops_events (timestamp, category, event) VALUES (?1, ?2, ?3)",
        params![timestamp, category, event],
    )
    .expect("insert event");
    conn.last_insert_rowid()
}

pub fn insert_run(
    conn: &Connection,
    label: &str,
    status: &str,
    started_at: &str,
    cost_usd: Option<f64>,
) -> i64 {
    conn.execute(
        "INSERT INTO agent_runs (label, model, status, started_at, created_at, cost_usd)
         VALUES (?1, 'claude-sonnet-4-5', ?2, ?3, ?3, ?4)",
        params![label, status, started_at, cost_usd],
    )
    .expect("insert run");
    conn.last_insert_rowid()
}
