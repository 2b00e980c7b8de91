use std::time::Duration;

use rusqlite::{Connection, params};
use tokio::sync::mpsc;

use opsboard_app::{AppConfig, AppServices, LogFeed};
use opsboard_db::Db;

fn seed_event(conn: &Connection, timestamp: &str, message: &str) {
    conn.execute(
        "INSERT INTO ops_events (timestamp, category, event) VALUES (?1, 'run', ?2)",
        params![timestamp, message],
    )
    .expect("insert event");
}

#[tokio::test(start_paused = true)]
async fn feed_pushes_new_events_and_stops_on_receiver_drop() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ops.db");
    let mut db = Db::open(&db_path).unwrap();
    db.migrate().unwrap();
    drop(db);

    let mut config = AppConfig::from_env();
    config.db_path = db_path.clone();
    let services = AppServices::new(&config);

    let seed = Connection::open(&db_path).unwrap();
    seed_event(&seed, "2026-03-01T10:00:00Z", "first event");

    let (tx, mut rx) = mpsc::channel(16);
    let feed = LogFeed::spawn(services.events.clone(), tx);

    let batch = tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("feed should push the initial batch")
        .expect("channel open");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].message, "first event");

    // New events keep flowing while the receiver is attached.
    seed_event(&seed, "2026-03-01T10:05:00Z", "second event");
    let batch = tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("feed should push the incremental batch")
        .expect("channel open");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].message, "second event");

    // Dropping the receiver tears the poll task down on its next push.
    drop(rx);
    seed_event(&seed, "2026-03-01T10:10:00Z", "third event");
    for _ in 0..60 {
        if feed.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    assert!(feed.is_finished());
}

#[tokio::test(start_paused = true)]
async fn idle_store_pushes_nothing_after_the_initial_batch() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ops.db");
    let mut db = Db::open(&db_path).unwrap();
    db.migrate().unwrap();
    drop(db);

    let mut config = AppConfig::from_env();
    config.db_path = db_path.clone();
    let services = AppServices::new(&config);

    let seed = Connection::open(&db_path).unwrap();
    seed_event(&seed, "2026-03-01T10:00:00Z", "only event");

    let (tx, mut rx) = mpsc::channel(16);
    let _feed = LogFeed::spawn(services.events.clone(), tx);

    let batch = tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("initial batch")
        .expect("channel open");
    assert_eq!(batch.len(), 1);

    // Several poll cycles against an unchanged store stay silent.
    let quiet = tokio::time::timeout(Duration::from_secs(20), rx.recv()).await;
    assert!(quiet.is_err());
}
