//! Document store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document store contract consumed by resource models.
//! - Isolate SQLite query details from model/service orchestration.
//!
//! # Invariants
//! - Consumer-facing queries start from `Query::active()`.
//! - Store APIs report absence as `None`/`0`; errors are transport or data
//!   integrity failures only.

pub mod document_store;
pub mod sqlite_store;

pub use document_store::{
    ensure_payload_field, DocumentStore, Filter, Query, StoreError, StoreResult, Update,
};
pub use sqlite_store::SqliteDocumentStore;
