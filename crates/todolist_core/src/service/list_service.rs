//! Category/item use-case service.
//!
//! # Responsibility
//! - Validate names and parent references above the repository layer.
//! - Provide create, rename, delete, toggle, list, search and split
//!   operations for every list screen.
//!
//! # Invariants
//! - Validation and reference failures never reach the store.
//! - Store failures surface as `Persistence` and apply nothing.
//! - Pending/done partitioning is derived from `done` only.
//! - Logs carry ids and counts, never record names.

use crate::model::list::{
    normalize_name, Category, CategoryId, Item, ItemId, ItemPartition, NameValidationError,
    RecordRef,
};
use crate::repo::list_repo::{ItemQuery, ItemSort, ListRepository, RepoError};
use crate::search::fold::fold_needle;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ListServiceResult<T> = Result<T, ListServiceError>;

/// Errors from list service operations.
#[derive(Debug)]
pub enum ListServiceError {
    /// Name is blank after trim.
    Validation(NameValidationError),
    /// Parent category does not exist or was deleted.
    CategoryNotFound(CategoryId),
    /// Target record does not exist or was deleted.
    NotFound(RecordRef),
    /// Store-level failure.
    Persistence(RepoError),
}

impl ListServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Stable machine-readable error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::CategoryNotFound(_) => "reference",
            Self::NotFound(_) => "not_found",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "parent category not found: {id}"),
            Self::NotFound(record) => write!(f, "{record} not found"),
            Self::Persistence(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NameValidationError> for ListServiceError {
    fn from(value: NameValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(record) => Self::NotFound(record),
            other => Self::Persistence(other),
        }
    }
}

/// Behavior switches for [`ListService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListServiceConfig {
    /// Deleting a category also deletes its items. When `false` the items
    /// stay stored as orphans, see [`ListService::list_orphaned_items`].
    pub cascade_delete_children: bool,
}

impl Default for ListServiceConfig {
    fn default() -> Self {
        Self {
            cascade_delete_children: true,
        }
    }
}

/// List service facade over a repository implementation.
pub struct ListService<R: ListRepository> {
    repo: R,
    config: ListServiceConfig,
}

impl<R: ListRepository> ListService<R> {
    /// Creates a service with the default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, ListServiceConfig::default())
    }

    pub fn with_config(repo: R, config: ListServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> ListServiceConfig {
        self.config
    }

    /// Creates one category with `done = false`.
    pub fn create_category(&self, name: &str) -> ListServiceResult<Category> {
        let name = normalize_name(name)?;
        let category = self
            .repo
            .insert_category(name.as_str())
            .map_err(|err| failed("category_create", err.into()))?;
        info!(
            "event=category_create module=service status=ok category_id={}",
            category.id
        );
        Ok(category)
    }

    /// Creates one item with `done = false` under an active category.
    pub fn create_item(&self, name: &str, category_id: CategoryId) -> ListServiceResult<Item> {
        let name = normalize_name(name)?;
        self.require_category(category_id)?;
        let item = self
            .repo
            .insert_item(category_id, name.as_str())
            .map_err(|err| match err {
                RepoError::NotFound(_) => ListServiceError::CategoryNotFound(category_id),
                other => failed("item_create", other.into()),
            })?;
        info!(
            "event=item_create module=service status=ok category_id={} item_id={}",
            category_id, item.id
        );
        Ok(item)
    }

    /// Loads one active category.
    pub fn get_category(&self, id: CategoryId) -> ListServiceResult<Option<Category>> {
        Ok(self.repo.get_category(id)?)
    }

    /// Loads one active item.
    pub fn get_item(&self, id: ItemId) -> ListServiceResult<Option<Item>> {
        Ok(self.repo.get_item(id)?)
    }

    /// Renames one category. Renaming to the current name is still a write.
    pub fn rename_category(&self, id: CategoryId, new_name: &str) -> ListServiceResult<Category> {
        let name = normalize_name(new_name)?;
        let mut category = self
            .repo
            .get_category(id)?
            .ok_or(ListServiceError::NotFound(RecordRef::Category(id)))?;
        category.name = name;
        let updated = self
            .repo
            .update_category(&category)
            .map_err(|err| failed("category_rename", err.into()))?;
        debug!("event=category_rename module=service status=ok category_id={id}");
        Ok(updated)
    }

    /// Renames one item. Renaming to the current name is still a write.
    pub fn rename_item(&self, id: ItemId, new_name: &str) -> ListServiceResult<Item> {
        let name = normalize_name(new_name)?;
        let mut item = self
            .repo
            .get_item(id)?
            .ok_or(ListServiceError::NotFound(RecordRef::Item(id)))?;
        item.name = name;
        let updated = self
            .repo
            .update_item(&item)
            .map_err(|err| failed("item_rename", err.into()))?;
        debug!("event=item_rename module=service status=ok item_id={id}");
        Ok(updated)
    }

    /// Deletes one category, applying the configured cascade policy.
    pub fn delete_category(&self, id: CategoryId) -> ListServiceResult<()> {
        let cascade = self.config.cascade_delete_children;
        let removed_items = self
            .repo
            .delete_category(id, cascade)
            .map_err(|err| failed("category_delete", err.into()))?;
        info!(
            "event=category_delete module=service status=ok category_id={id} cascade={cascade} removed_items={removed_items}"
        );
        Ok(())
    }

    /// Deletes one item.
    pub fn delete_item(&self, id: ItemId) -> ListServiceResult<()> {
        self.repo
            .delete_item(id)
            .map_err(|err| failed("item_delete", err.into()))?;
        info!("event=item_delete module=service status=ok item_id={id}");
        Ok(())
    }

    /// Flips `done` on one record and returns the new value.
    pub fn toggle_done(&self, record: RecordRef) -> ListServiceResult<bool> {
        let done = match record {
            RecordRef::Category(id) => {
                let mut category = self
                    .repo
                    .get_category(id)?
                    .ok_or(ListServiceError::NotFound(record))?;
                category.done = !category.done;
                self.repo
                    .update_category(&category)
                    .map_err(|err| failed("toggle_done", err.into()))?
                    .done
            }
            RecordRef::Item(id) => {
                let mut item = self
                    .repo
                    .get_item(id)?
                    .ok_or(ListServiceError::NotFound(record))?;
                item.done = !item.done;
                self.repo
                    .update_item(&item)
                    .map_err(|err| failed("toggle_done", err.into()))?
                    .done
            }
        };
        debug!(
            "event=toggle_done module=service status=ok kind={} id={} done={done}",
            record.kind_label(),
            record.id()
        );
        Ok(done)
    }

    /// Lists active categories in insertion order.
    pub fn list_categories(&self) -> ListServiceResult<Vec<Category>> {
        self.repo
            .list_categories()
            .map_err(|err| failed("category_list", err.into()))
    }

    /// Lists active items of one category in insertion order.
    pub fn list_items(&self, category_id: CategoryId) -> ListServiceResult<Vec<Item>> {
        self.require_category(category_id)?;
        self.repo
            .query_items(&ItemQuery::all(category_id))
            .map_err(|err| failed("item_list", err.into()))
    }

    /// Searches items of one category by folded substring, sorted by name.
    ///
    /// Blank input returns exactly [`ListService::list_items`].
    pub fn search_items(&self, category_id: CategoryId, text: &str) -> ListServiceResult<Vec<Item>> {
        let Some(needle) = fold_needle(text) else {
            return self.list_items(category_id);
        };
        self.require_category(category_id)?;
        let query = ItemQuery {
            category_id,
            name_contains: Some(needle),
            sort: ItemSort::NameAsc,
        };
        let items = self
            .repo
            .query_items(&query)
            .map_err(|err| failed("item_search", err.into()))?;
        debug!(
            "event=item_search module=service status=ok category_id={category_id} hits={}",
            items.len()
        );
        Ok(items)
    }

    /// Splits one category's items into pending and done halves.
    pub fn partition_items(&self, category_id: CategoryId) -> ListServiceResult<ItemPartition> {
        self.list_items(category_id).map(ItemPartition::from_items)
    }

    /// Lists active items left behind by non-cascading category deletes.
    pub fn list_orphaned_items(&self) -> ListServiceResult<Vec<Item>> {
        self.repo
            .list_orphaned_items()
            .map_err(|err| failed("orphan_list", err.into()))
    }

    fn require_category(&self, category_id: CategoryId) -> ListServiceResult<Category> {
        self.repo
            .get_category(category_id)
            .map_err(|err| failed("category_lookup", err.into()))?
            .ok_or(ListServiceError::CategoryNotFound(category_id))
    }
}

fn failed(event: &'static str, err: ListServiceError) -> ListServiceError {
    if err.is_persistence() {
        error!(
            "event={event} module=service status=error error_code={} error={err}",
            err.code()
        );
    } else {
        warn!(
            "event={event} module=service status=error error_code={}",
            err.code()
        );
    }
    err
}
