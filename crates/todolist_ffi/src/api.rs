//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose category/item list use cases to Dart via FRB.
//! - Flatten core records and errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store calls are serialized by one process-wide lock; no search overlaps
//!   a write.
//! - Each store call opens its own connection and drops it before returning.

use log::warn;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use todolist_core::db::open_db;
use todolist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, Item, ItemPartition, ListService, ListServiceConfig, ListServiceError,
    ListServiceResult, RecordRef, SearchSequencer, SearchTicket, SqliteListRepository,
};
use uuid::Uuid;

const DEFAULT_DB_FILE_NAME: &str = "todolist.sqlite3";
const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";

static STORE: Lazy<Mutex<StoreSettings>> = Lazy::new(|| Mutex::new(StoreSettings::default()));
static SEARCH_SEQUENCER: Lazy<SearchSequencer> = Lazy::new(SearchSequencer::new);

#[derive(Debug, Default)]
struct StoreSettings {
    db_path: Option<PathBuf>,
    config: ListServiceConfig,
}

impl StoreSettings {
    fn resolve_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        if let Ok(raw) = std::env::var(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Points the store at `db_path` and sets the category delete policy.
///
/// Until called, the path comes from `TODOLIST_DB_PATH` or a temp-dir
/// default, and deletes cascade.
///
/// # FFI contract
/// - Sync call, no file-system work; the file is created on first use.
/// - May be called again to switch stores; calls in flight finish first.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String, cascade_delete_children: bool) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let mut settings = STORE.lock().unwrap_or_else(PoisonError::into_inner);
    settings.db_path = Some(PathBuf::from(trimmed));
    settings.config = ListServiceConfig {
        cascade_delete_children,
    };
    String::new()
}

/// Category row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    /// Stable category ID in string form.
    pub id: String,
    pub name: String,
    pub done: bool,
}

/// Item row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Stable item ID in string form.
    pub id: String,
    /// Owning category ID in string form.
    pub category_id: String,
    pub name: String,
    pub done: bool,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
}

/// Category list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListResponse {
    pub ok: bool,
    /// Categories in insertion order (empty on failure).
    pub items: Vec<CategoryRow>,
    /// Failure class, see [`ItemListResponse::error_kind`].
    pub error_kind: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Item list response envelope, shared by plain listing and search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemListResponse {
    pub ok: bool,
    /// Items in the order the call defines (empty on failure).
    pub items: Vec<ItemRow>,
    /// Failure class (`validation|reference|not_found|persistence|invalid_id|store`).
    pub error_kind: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
    /// Search sequence number; only set by `item_search`.
    pub search_ticket: Option<u64>,
}

/// Pending/done split response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResponse {
    pub ok: bool,
    pub pending: Vec<ItemRow>,
    pub done: Vec<ItemRow>,
    /// Failure class, see [`ItemListResponse::error_kind`].
    pub error_kind: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created or affected record ID.
    pub id: Option<String>,
    /// New `done` value after a toggle.
    pub done: Option<bool>,
    /// Failure class, see [`ItemListResponse::error_kind`].
    pub error_kind: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Uuid) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            done: None,
            error_kind: None,
            message: message.into(),
        }
    }

    fn failure(op: &str, failure: FfiFailure) -> Self {
        Self {
            ok: false,
            id: None,
            done: None,
            error_kind: Some(failure.kind.to_string()),
            message: format!("{op} failed: {}", failure.message),
        }
    }
}

impl ItemListResponse {
    fn from_result(op: &str, result: Result<Vec<Item>, FfiFailure>) -> Self {
        match result {
            Ok(items) => {
                let message = if items.is_empty() {
                    "No items.".to_string()
                } else {
                    format!("Found {} item(s).", items.len())
                };
                Self {
                    ok: true,
                    items: items.into_iter().map(to_item_row).collect(),
                    error_kind: None,
                    message,
                    search_ticket: None,
                }
            }
            Err(failure) => Self {
                ok: false,
                items: Vec::new(),
                error_kind: Some(failure.kind.to_string()),
                message: format!("{op} failed: {}", failure.message),
                search_ticket: None,
            },
        }
    }
}

/// Lists active categories in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn category_list() -> CategoryListResponse {
    match with_list_service(|service| service.list_categories()) {
        Ok(categories) => CategoryListResponse {
            ok: true,
            message: format!("Found {} category(ies).", categories.len()),
            items: categories.into_iter().map(to_category_row).collect(),
            error_kind: None,
        },
        Err(failure) => CategoryListResponse {
            ok: false,
            items: Vec::new(),
            error_kind: Some(failure.kind.to_string()),
            message: format!("category_list failed: {}", failure.message),
        },
    }
}

/// Creates a category; the name is trimmed and must not be blank.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns created category ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn category_create(name: String) -> ActionResponse {
    match with_list_service(|service| service.create_category(&name)) {
        Ok(category) => ActionResponse::success("Category created.", category.id),
        Err(failure) => ActionResponse::failure("category_create", failure),
    }
}

/// Renames a category.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn category_rename(category_id: String, new_name: String) -> ActionResponse {
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.rename_category(id, &new_name)));
    match result {
        Ok(category) => ActionResponse::success("Category renamed.", category.id),
        Err(failure) => ActionResponse::failure("category_rename", failure),
    }
}

/// Deletes a category using the configured cascade policy.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn category_delete(category_id: String) -> ActionResponse {
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.delete_category(id)).map(|()| id));
    match result {
        Ok(id) => ActionResponse::success("Category deleted.", id),
        Err(failure) => ActionResponse::failure("category_delete", failure),
    }
}

/// Flips `done` on a category.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the new `done` value on success.
#[flutter_rust_bridge::frb(sync)]
pub fn category_toggle(category_id: String) -> ActionResponse {
    toggle("category_toggle", &category_id, RecordRef::Category)
}

/// Lists active items of one category in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn item_list(category_id: String) -> ItemListResponse {
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.list_items(id)));
    ItemListResponse::from_result("item_list", result)
}

/// Creates an item under an active category.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns created item ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn item_create(category_id: String, name: String) -> ActionResponse {
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.create_item(&name, id)));
    match result {
        Ok(item) => ActionResponse::success("Item created.", item.id),
        Err(failure) => ActionResponse::failure("item_create", failure),
    }
}

/// Renames an item.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn item_rename(item_id: String, new_name: String) -> ActionResponse {
    let result = parse_id(&item_id)
        .and_then(|id| with_list_service(|service| service.rename_item(id, &new_name)));
    match result {
        Ok(item) => ActionResponse::success("Item renamed.", item.id),
        Err(failure) => ActionResponse::failure("item_rename", failure),
    }
}

/// Deletes an item.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(item_id: String) -> ActionResponse {
    let result = parse_id(&item_id)
        .and_then(|id| with_list_service(|service| service.delete_item(id)).map(|()| id));
    match result {
        Ok(id) => ActionResponse::success("Item deleted.", id),
        Err(failure) => ActionResponse::failure("item_delete", failure),
    }
}

/// Flips `done` on an item.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns the new `done` value on success.
#[flutter_rust_bridge::frb(sync)]
pub fn item_toggle(item_id: String) -> ActionResponse {
    toggle("item_toggle", &item_id, RecordRef::Item)
}

/// Searches one category's items by diacritic- and case-insensitive
/// substring, sorted by name. Blank text lists every item in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Every call carries a fresh `search_ticket`; a result whose ticket fails
///   `item_search_is_current` was superseded and should be dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn item_search(category_id: String, text: String) -> ItemListResponse {
    let ticket = SEARCH_SEQUENCER.issue();
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.search_items(id, &text)));
    let mut response = ItemListResponse::from_result("item_search", result);
    response.search_ticket = Some(ticket.value());
    response
}

/// Whether `ticket` still belongs to the latest `item_search` call.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn item_search_is_current(ticket: u64) -> bool {
    SEARCH_SEQUENCER.is_current(SearchTicket::from_value(ticket))
}

/// Splits one category's items into pending and done halves.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn item_split(category_id: String) -> SplitResponse {
    let result = parse_id(&category_id)
        .and_then(|id| with_list_service(|service| service.partition_items(id)));
    match result {
        Ok(ItemPartition { pending, done }) => SplitResponse {
            ok: true,
            message: format!("{} pending, {} done.", pending.len(), done.len()),
            pending: pending.into_iter().map(to_item_row).collect(),
            done: done.into_iter().map(to_item_row).collect(),
            error_kind: None,
        },
        Err(failure) => SplitResponse {
            ok: false,
            pending: Vec::new(),
            done: Vec::new(),
            error_kind: Some(failure.kind.to_string()),
            message: format!("item_split failed: {}", failure.message),
        },
    }
}

struct FfiFailure {
    kind: &'static str,
    message: String,
}

impl From<ListServiceError> for FfiFailure {
    fn from(value: ListServiceError) -> Self {
        Self {
            kind: value.code(),
            message: value.to_string(),
        }
    }
}

fn toggle(op: &str, raw_id: &str, record: fn(Uuid) -> RecordRef) -> ActionResponse {
    let result = parse_id(raw_id).and_then(|id| {
        with_list_service(|service| service.toggle_done(record(id))).map(|done| (id, done))
    });
    match result {
        Ok((id, done)) => {
            let mut response = ActionResponse::success("Done state updated.", id);
            response.done = Some(done);
            response
        }
        Err(failure) => ActionResponse::failure(op, failure),
    }
}

fn parse_id(raw: &str) -> Result<Uuid, FfiFailure> {
    Uuid::parse_str(raw.trim()).map_err(|err| FfiFailure {
        kind: "invalid_id",
        message: format!("invalid id `{raw}`: {err}"),
    })
}

fn with_list_service<T>(
    f: impl FnOnce(&ListService<SqliteListRepository<'_>>) -> ListServiceResult<T>,
) -> Result<T, FfiFailure> {
    let settings = STORE.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = settings.resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=store_open module=ffi status=error error={err}");
        FfiFailure {
            kind: "store",
            message: format!("list DB open failed: {err}"),
        }
    })?;
    let repo = SqliteListRepository::try_new(&conn).map_err(|err| FfiFailure {
        kind: "store",
        message: format!("list repo init failed: {err}"),
    })?;
    let service = ListService::with_config(repo, settings.config);
    f(&service).map_err(FfiFailure::from)
}

fn to_category_row(category: Category) -> CategoryRow {
    CategoryRow {
        id: category.id.to_string(),
        name: category.name,
        done: category.done,
    }
}

fn to_item_row(item: Item) -> ItemRow {
    ItemRow {
        id: item.id.to_string(),
        category_id: item.category_id.to_string(),
        name: item.name,
        done: item.done,
        created_at_ms: item.created_at,
    }
}
