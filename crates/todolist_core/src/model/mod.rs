//! Domain model for the category/item list hierarchy.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one record shape for the plain, categorized and split screens.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Deletion is represented by store tombstones, never by a model flag.

pub mod list;
