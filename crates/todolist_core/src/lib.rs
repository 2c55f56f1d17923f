//! Core domain logic for the to-do list app.
//! This crate is the single source of truth for list invariants.

pub mod db;
pub mod delivery;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use delivery::{ChannelSink, FnSink, ListView, RefreshSink, SearchSequencer, SearchTicket};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::list::{
    Category, CategoryId, Item, ItemId, ItemPartition, NameValidationError, RecordRef,
};
pub use repo::list_repo::{
    ItemQuery, ItemSort, ListRepository, RepoError, RepoResult, SqliteListRepository,
};
pub use search::fold::fold_name;
pub use service::list_service::{
    ListService, ListServiceConfig, ListServiceError, ListServiceResult,
};
pub use service::presenter::{ListPresenter, Screen};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
