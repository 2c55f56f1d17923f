//! FFI boundary crate for the Flutter client.
//! Thin wrappers over `todolist_core`; no list logic lives here.

pub mod api;
