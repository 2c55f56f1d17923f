//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable-store contract used by the list service.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod list_repo;
