//! Text matching helpers for item search.
//!
//! # Responsibility
//! - Define the folded comparison key shared by Rust and SQL code paths.

pub mod fold;
