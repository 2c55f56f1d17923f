//! Category/item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the durable-store contract (insert/update/delete/query) over
//!   `categories` and `items`.
//! - Keep SQL details, ordering and tombstone handling inside the
//!   persistence boundary.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned.
//! - Default ordering is insertion order: `sort_order ASC, uuid ASC`.
//! - `sort_order` values are never reused, tombstoned rows included.
//! - Item inserts only succeed under an active category.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::list::{Category, CategoryId, Item, ItemId, RecordRef};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    done,
    sort_order,
    created_at,
    updated_at
FROM categories";

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    category_uuid,
    name,
    done,
    sort_order,
    created_at,
    updated_at
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for list persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist or is tombstoned.
    NotFound(RecordRef),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "list repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted list data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied by [`ListRepository::query_items`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemSort {
    /// Insertion order.
    #[default]
    Position,
    /// Folded name ascending, ties broken by raw name then insertion order.
    NameAsc,
}

/// Query options for listing the items of one category.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub category_id: CategoryId,
    /// Already-folded substring the folded item name must contain.
    pub name_contains: Option<String>,
    pub sort: ItemSort,
}

impl ItemQuery {
    /// All active items of `category_id` in insertion order.
    pub fn all(category_id: CategoryId) -> Self {
        Self {
            category_id,
            name_contains: None,
            sort: ItemSort::Position,
        }
    }
}

/// Durable-store interface used by the list service.
pub trait ListRepository {
    /// Inserts one category at the end of the category order.
    fn insert_category(&self, name: &str) -> RepoResult<Category>;
    /// Loads one active category.
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Lists active categories in insertion order.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Writes `name` and `done` of an active category and returns the stored row.
    fn update_category(&self, category: &Category) -> RepoResult<Category>;
    /// Tombstones one category, and its active items when `cascade_children`.
    ///
    /// Returns the number of items tombstoned alongside.
    fn delete_category(&self, id: CategoryId, cascade_children: bool) -> RepoResult<usize>;
    /// Inserts one item at the end of its category.
    fn insert_item(&self, category_id: CategoryId, name: &str) -> RepoResult<Item>;
    /// Loads one active item.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Writes `name` and `done` of an active item and returns the stored row.
    fn update_item(&self, item: &Item) -> RepoResult<Item>;
    /// Tombstones one item.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// Lists active items matching `query`.
    fn query_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>>;
    /// Lists active items whose category is tombstoned.
    fn list_orphaned_items(&self) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn insert_category(&self, name: &str) -> RepoResult<Category> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO categories (uuid, name, done, sort_order, is_deleted)
             VALUES (
                ?1,
                ?2,
                0,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM categories),
                0
             );",
            params![id.to_string(), name],
        )?;
        self.get_category(id)?
            .ok_or(RepoError::NotFound(RecordRef::Category(id)))
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE uuid = ?1
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE is_deleted = 0
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn update_category(&self, category: &Category) -> RepoResult<Category> {
        let changed = self.conn.execute(
            "UPDATE categories
             SET name = ?2,
                 done = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![
                category.id.to_string(),
                category.name.as_str(),
                bool_to_int(category.done),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Category(category.id)));
        }
        self.get_category(category.id)?
            .ok_or(RepoError::NotFound(RecordRef::Category(category.id)))
    }

    fn delete_category(&self, id: CategoryId, cascade_children: bool) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE categories
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Category(id)));
        }

        let removed_items = if cascade_children {
            tx.execute(
                "UPDATE items
                 SET is_deleted = 1,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE category_uuid = ?1
                   AND is_deleted = 0;",
                [id.to_string()],
            )?
        } else {
            0
        };

        tx.commit()?;
        Ok(removed_items)
    }

    fn insert_item(&self, category_id: CategoryId, name: &str) -> RepoResult<Item> {
        let id = Uuid::new_v4();
        let changed = self.conn.execute(
            "INSERT INTO items (uuid, category_uuid, name, done, sort_order, is_deleted)
             SELECT
                ?1,
                ?2,
                ?3,
                0,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM items WHERE category_uuid = ?2),
                0
             WHERE EXISTS (
                SELECT 1
                FROM categories
                WHERE uuid = ?2
                  AND is_deleted = 0
             );",
            params![id.to_string(), category_id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Category(category_id)));
        }
        self.get_item(id)?
            .ok_or(RepoError::NotFound(RecordRef::Item(id)))
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE uuid = ?1
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn update_item(&self, item: &Item) -> RepoResult<Item> {
        let changed = self.conn.execute(
            "UPDATE items
             SET name = ?2,
                 done = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![item.id.to_string(), item.name.as_str(), bool_to_int(item.done)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Item(item.id)));
        }
        self.get_item(item.id)?
            .ok_or(RepoError::NotFound(RecordRef::Item(item.id)))
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET is_deleted = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Item(id)));
        }
        Ok(())
    }

    fn query_items(&self, query: &ItemQuery) -> RepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE category_uuid = ? AND is_deleted = 0");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.category_id.to_string())];

        if let Some(needle) = query.name_contains.as_deref() {
            sql.push_str(" AND instr(fold_name(name), ?) > 0");
            bind_values.push(Value::Text(needle.to_string()));
        }

        match query.sort {
            ItemSort::Position => sql.push_str(" ORDER BY sort_order ASC, uuid ASC"),
            ItemSort::NameAsc => {
                sql.push_str(" ORDER BY fold_name(name) ASC, name ASC, sort_order ASC")
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn list_orphaned_items(&self) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                i.uuid AS uuid,
                i.category_uuid AS category_uuid,
                i.name AS name,
                i.done AS done,
                i.sort_order AS sort_order,
                i.created_at AS created_at,
                i.updated_at AS updated_at
             FROM items i
             INNER JOIN categories c ON c.uuid = i.category_uuid
             WHERE i.is_deleted = 0
               AND c.is_deleted = 1
             ORDER BY c.sort_order ASC, i.sort_order ASC, i.uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Category {
        id: parse_uuid(&uuid_text, "categories.uuid")?,
        name: parse_name(row.get("name")?, "categories.name")?,
        done: parse_bool(row.get("done")?, "categories.done")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let category_text: String = row.get("category_uuid")?;
    Ok(Item {
        id: parse_uuid(&uuid_text, "items.uuid")?,
        category_id: parse_uuid(&category_text, "items.category_uuid")?,
        name: parse_name(row.get("name")?, "items.name")?,
        done: parse_bool(row.get("done")?, "items.done")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_name(value: String, column: &'static str) -> RepoResult<String> {
    if value.trim().is_empty() {
        return Err(RepoError::InvalidData(format!("blank name in {column}")));
    }
    Ok(value)
}

fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
