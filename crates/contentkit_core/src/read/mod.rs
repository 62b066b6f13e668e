//! Read-side projection.
//!
//! # Responsibility
//! - Define the read model consumed by the action layer for possibly stale
//!   reads (replicas, denormalized views).
//! - Expose the propagation hook called after every write.
//!
//! # Invariants
//! - Read models never mutate the write side.
//! - Propagation is not implemented: the default hook only logs, so read
//!   models lag the write model until something else refreshes them.

use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::model::kind::ResourceKind;
use crate::repo::{DocumentStore, Query, StoreResult};
use log::debug;

/// Write-side change handed to the read projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection<'a> {
    Created(&'a Document),
    Updated(&'a Document),
    Deleted(&'a Document),
}

impl Projection<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }

    pub fn document(&self) -> &Document {
        match self {
            Self::Created(document) | Self::Updated(document) | Self::Deleted(document) => {
                document
            }
        }
    }
}

/// Read-side lookup path for one resource kind.
pub trait ReadModel {
    fn find_all(&self) -> StoreResult<Vec<Document>>;
    fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Document>>;

    /// Called after a committed write. Extension point for projection sync.
    fn project(&self, change: Projection<'_>) -> StoreResult<()> {
        debug!(
            "event=read_projection module=read status=deferred change={} id={}",
            change.label(),
            change.document().id
        );
        Ok(())
    }
}

/// Read model backed by its own document store, e.g. a replica connection.
#[derive(Clone)]
pub struct StoreReadModel<S> {
    store: S,
    kind: &'static ResourceKind,
}

impl<S: DocumentStore> StoreReadModel<S> {
    pub fn new(store: S, kind: &'static ResourceKind) -> Self {
        Self { store, kind }
    }
}

impl<S: DocumentStore> ReadModel for StoreReadModel<S> {
    fn find_all(&self) -> StoreResult<Vec<Document>> {
        self.store.find_rows(self.kind.name, &Query::active())
    }

    fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        self.store.find_row(self.kind.name, &Query::active().id(id))
    }
}
