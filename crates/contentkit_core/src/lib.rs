//! Soft-delete resource layer for articles and categories.
//! This crate is the single source of truth for resource invariants.

pub mod config;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod model;
pub mod read;
pub mod repo;
pub mod service;
pub mod validation;
pub mod write;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use endpoint::{ApiResponse, CategoryEndpoints, ResourceEndpoints};
pub use error::{ResourceError, ResourceResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{Article, ARTICLE};
pub use model::category::{Category, CATEGORY};
pub use model::document::Document;
pub use model::id::{ParseIdError, ResourceId};
pub use model::kind::{FieldRule, Relation, ResourceKind};
pub use read::{Projection, ReadModel, StoreReadModel};
pub use repo::{DocumentStore, Query, SqliteDocumentStore, StoreError, StoreResult, Update};
pub use service::category_action::{CascadeOutcome, CategoryAction};
pub use service::resource_action::ResourceAction;
pub use validation::integrity::{require_existing, ResourceLookup};
pub use validation::resource_validator::ResourceValidator;
pub use validation::{check, FieldError, Rule, Schema};
pub use write::WriteModel;

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
