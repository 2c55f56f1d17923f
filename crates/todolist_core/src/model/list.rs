//! Category/Item domain model.
//!
//! # Responsibility
//! - Define the two-level list hierarchy shared by every screen.
//! - Provide name normalization used before any persistence write.
//!
//! # Invariants
//! - `id` is stable and never reused for another record of the same kind.
//! - `name` is trimmed and never empty.
//! - `done` is the single source of truth for pending/done partitioning.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a category.
pub type CategoryId = Uuid;

/// Stable identifier of an item.
pub type ItemId = Uuid;

/// Named grouping that owns zero or more items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub done: bool,
    /// Insertion position among all categories.
    pub sort_order: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// To-do entry owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Owning category (back-reference, never an ownership edge).
    pub category_id: CategoryId,
    pub name: String,
    pub done: bool,
    /// Insertion position inside the owning category.
    pub sort_order: i64,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Reference to one record of either kind.
///
/// Used by operations that apply to both levels of the hierarchy, such as
/// toggling the done flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordRef {
    Category(CategoryId),
    Item(ItemId),
}

impl RecordRef {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Category(id) | Self::Item(id) => *id,
        }
    }

    /// Lowercase record kind label used in logs and messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::Item(_) => "item",
        }
    }
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind_label(), self.id())
    }
}

/// Pending/done split of one category's items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPartition {
    /// Items with `done == false`, insertion order.
    pub pending: Vec<Item>,
    /// Items with `done == true`, insertion order.
    pub done: Vec<Item>,
}

impl ItemPartition {
    /// Splits items by their `done` flag, keeping relative order.
    pub fn from_items(items: Vec<Item>) -> Self {
        let (done, pending) = items.into_iter().partition(|item| item.done);
        Self { pending, done }
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.done.is_empty()
    }
}

/// Name validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    /// Name is empty or whitespace-only.
    Blank,
}

impl Display for NameValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "name must not be blank"),
        }
    }
}

impl Error for NameValidationError {}

/// Trims a user-supplied name and rejects blank input.
pub fn normalize_name(value: &str) -> Result<String, NameValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NameValidationError::Blank);
    }
    Ok(trimmed.to_string())
}
