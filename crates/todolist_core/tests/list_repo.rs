use rusqlite::Connection;
use todolist_core::db::open_db_in_memory;
use todolist_core::{
    ItemQuery, ItemSort, ListRepository, RecordRef, RepoError, SqliteListRepository,
};
use uuid::Uuid;

#[test]
fn insert_assigns_increasing_sort_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();

    let first = repo.insert_category("First").unwrap();
    let second = repo.insert_category("Second").unwrap();
    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
    assert!(!first.done);

    let listed = repo.list_categories().unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn sort_order_is_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let category = repo.insert_category("Home").unwrap();

    let first = repo.insert_item(category.id, "a").unwrap();
    repo.delete_item(first.id).unwrap();
    let second = repo.insert_item(category.id, "b").unwrap();
    assert_eq!(second.sort_order, first.sort_order + 1);
}

#[test]
fn insert_item_under_missing_category_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo.insert_item(missing, "orphan").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(RecordRef::Category(id)) if id == missing));
}

#[test]
fn update_and_delete_missing_rows_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let category = repo.insert_category("Home").unwrap();
    let item = repo.insert_item(category.id, "Dishes").unwrap();

    repo.delete_item(item.id).unwrap();
    let err = repo.delete_item(item.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(RecordRef::Item(id)) if id == item.id));

    let err = repo.update_item(&item).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(RecordRef::Item(_))));
    assert!(repo.get_item(item.id).unwrap().is_none());
}

#[test]
fn query_items_filters_by_folded_substring_and_sorts_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let category = repo.insert_category("Errands").unwrap();
    let other = repo.insert_category("Other").unwrap();
    repo.insert_item(category.id, "Pick up café order").unwrap();
    repo.insert_item(category.id, "Buy CAFE filters").unwrap();
    repo.insert_item(category.id, "Post office").unwrap();
    repo.insert_item(other.id, "cafe elsewhere").unwrap();

    let query = ItemQuery {
        category_id: category.id,
        name_contains: Some("cafe".to_string()),
        sort: ItemSort::NameAsc,
    };
    let names: Vec<_> = repo
        .query_items(&query)
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, vec!["Buy CAFE filters", "Pick up café order"]);
}

#[test]
fn delete_category_cascade_flag_controls_children() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();

    let cascaded = repo.insert_category("Cascaded").unwrap();
    repo.insert_item(cascaded.id, "a").unwrap();
    repo.insert_item(cascaded.id, "b").unwrap();
    assert_eq!(repo.delete_category(cascaded.id, true).unwrap(), 2);

    let kept = repo.insert_category("Kept").unwrap();
    let left_behind = repo.insert_item(kept.id, "c").unwrap();
    assert_eq!(repo.delete_category(kept.id, false).unwrap(), 0);

    let orphans = repo.list_orphaned_items().unwrap();
    assert_eq!(orphans, vec![left_behind]);

    let err = repo.delete_category(kept.id, true).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(RecordRef::Category(_))));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteListRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn invalid_persisted_flag_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let category = repo.insert_category("Home").unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE categories SET done = 7 WHERE uuid = ?1;",
        [category.id.to_string()],
    )
    .unwrap();

    let err = repo.get_category(category.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("categories.done")));
}
