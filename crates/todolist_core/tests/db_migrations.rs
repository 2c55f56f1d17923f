use rusqlite::Connection;
use todolist_core::db::migrations::latest_version;
use todolist_core::db::{open_db, open_db_in_memory, DbError};
use todolist_core::{ListService, SqliteListRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "items");
    assert_index_exists(&conn, "idx_items_category_order");
}

#[test]
fn items_table_exposes_expected_columns() {
    let conn = open_db_in_memory().unwrap();
    let columns = table_columns(&conn, "items");
    for expected in [
        "uuid",
        "category_uuid",
        "name",
        "done",
        "sort_order",
        "is_deleted",
        "created_at",
        "updated_at",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing {expected}");
    }
}

#[test]
fn reopening_file_database_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("todo.sqlite3");

    let category_id = {
        let conn = open_db(&path).unwrap();
        let service = ListService::new(SqliteListRepository::try_new(&conn).unwrap());
        let category = service.create_category("Work").unwrap();
        service.create_item("Email", category.id).unwrap();
        category.id
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let service = ListService::new(SqliteListRepository::try_new(&conn).unwrap());
    let items = service.list_items(category_id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Email");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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

#[test]
fn fold_function_is_available_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let folded: String = conn
        .query_row("SELECT fold_name('Élan');", [], |row| row.get(0))
        .unwrap();
    assert_eq!(folded, "elan");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        columns.push(row.get::<_, String>(1).unwrap());
    }
    columns
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
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
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
