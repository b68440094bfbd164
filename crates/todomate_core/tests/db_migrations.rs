use rusqlite::Connection;
use todomate_core::db::migrations::latest_version;
use todomate_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "life_areas");
    assert_table_exists(&conn, "weekly_goals");
    assert_index_exists(&conn, "idx_weekly_goals_area_week");
}

#[test]
fn fresh_database_seeds_five_default_areas() {
    let conn = open_db_in_memory().unwrap();
    let names = conn
        .prepare("SELECT name FROM life_areas WHERE is_default = 1 ORDER BY order_index;")
        .unwrap()
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        names,
        vec!["Career", "Health", "Learning", "Relationships", "Finance"]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todomate.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let areas: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM life_areas;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(areas, 5);
}

#[test]
fn upgrade_from_v2_dedupes_goals_keeping_latest_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v2.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0002_life_areas.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO weekly_goals (life_area_id, week_start, target_percentage, created_at)
         VALUES (1, 1000, 10, 1), (1, 1000, 40, 2), (2, 1000, 20, 3);
         PRAGMA user_version = 2;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let kept: Vec<(i64, i64)> = conn
        .prepare(
            "SELECT life_area_id, target_percentage FROM weekly_goals
             WHERE week_start = 1000 ORDER BY life_area_id;",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(kept, vec![(1, 40), (2, 20)]);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        schema_object_exists(conn, "table", table_name),
        "table {table_name} does not exist"
    );
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert!(
        schema_object_exists(conn, "index", index_name),
        "index {index_name} does not exist"
    );
}

fn schema_object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
