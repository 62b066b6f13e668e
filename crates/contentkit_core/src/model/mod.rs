//! Resource domain model.
//!
//! # Responsibility
//! - Define identifiers, the generic stored document and per-kind
//!   configuration consumed by the generic engines.
//! - Provide typed views for the concrete kinds (article, category).
//!
//! # Invariants
//! - Every resource is identified by a stable `ResourceId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod article;
pub mod category;
pub mod document;
pub mod id;
pub mod kind;
