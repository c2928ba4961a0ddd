use corral_database::{Database, DatabaseError, Migration};

async fn memory_database() -> Database {
    // One connection: every pooled connection to sqlite::memory: would
    // otherwise see its own empty database.
    Database::builder()
        .url("sqlite::memory:")
        .max_connections(1)
        .init()
        .await
        .expect("in-memory database")
}

fn demo_migrations() -> Vec<Migration> {
    vec![
        Migration::new("core", "0001", "CREATE TABLE demo (id INTEGER PRIMARY KEY, label TEXT)"),
        Migration::new("core", "0002", "CREATE INDEX demo_label ON demo (label)"),
    ]
}

#[tokio::test]
async fn migrations_apply_in_order() {
    let db = memory_database().await;

    let report = db.migrate(&demo_migrations()).await.expect("first pass");
    assert_eq!(report.applied.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.applied[0].version, "0001");
    assert_eq!(report.applied[1].version, "0002");
}

#[tokio::test]
async fn second_pass_skips_applied_versions() {
    let db = memory_database().await;
    let migrations = demo_migrations();

    db.migrate(&migrations).await.expect("first pass");
    let report = db.migrate(&migrations).await.expect("second pass");

    assert!(report.applied.is_empty(), "nothing new to apply");
    assert_eq!(report.skipped.len(), 2);
}

#[tokio::test]
async fn checksum_drift_fails_the_run() {
    let db = memory_database().await;

    db.migrate(&[Migration::new("core", "0001", "CREATE TABLE demo (id INTEGER)")])
        .await
        .expect("first pass");

    let err = db
        .migrate(&[Migration::new("core", "0001", "CREATE TABLE demo (id BIGINT)")])
        .await
        .expect_err("drifted script must fail");
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn failed_script_applies_nothing() {
    let db = memory_database().await;

    let err = db
        .migrate(&[Migration::new("core", "0001", "CREATE TABLE (")])
        .await
        .expect_err("broken script");
    assert!(matches!(err, DatabaseError::Sql { .. }));

    let report = db
        .migrate(&[Migration::new("core", "0002", "CREATE TABLE ok (id INTEGER)")])
        .await
        .expect("later run succeeds");
    assert_eq!(report.applied.len(), 1);
}
