//! Resource write model.
//!
//! # Responsibility
//! - Provide the soft-delete CRUD contract for one resource kind on top of a
//!   `DocumentStore`.
//! - Persist whitelisted payload fields only.
//!
//! # Invariants
//! - Every query issued here starts from `Query::active()`.
//! - Absence is reported as `None`; only store failures are errors.
//! - Updates are partial: fields absent from the body are left untouched.

mod hierarchy;

use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::model::kind::ResourceKind;
use crate::repo::{DocumentStore, Query, StoreResult, Update};
use log::debug;
use serde_json::{Map, Value};

/// Generic write model for one resource kind.
#[derive(Clone)]
pub struct WriteModel<S> {
    store: S,
    kind: &'static ResourceKind,
}

impl<S: DocumentStore> WriteModel<S> {
    pub fn new(store: S, kind: &'static ResourceKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores a new resource built from the whitelisted fields of `body`.
    ///
    /// Whitelisted fields missing from `body` are stored as `null`.
    pub fn create(&self, body: &Map<String, Value>) -> StoreResult<Document> {
        let data = self.kind.pick_with_defaults(body);
        let document = self.store.insert_row(self.kind.name, &data)?;
        debug!(
            "event=resource_create module=write status=ok kind={} id={}",
            self.kind.name, document.id
        );
        Ok(document)
    }

    /// Loads one active resource.
    pub fn find_by_id(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        self.store.find_row(self.kind.name, &Query::active().id(id))
    }

    /// Merges the whitelisted fields of `body` into one active resource.
    pub fn update(
        &self,
        id: ResourceId,
        body: &Map<String, Value>,
    ) -> StoreResult<Option<Document>> {
        let update = Update::merge(self.kind.pick(body));
        let updated = self
            .store
            .update_row(self.kind.name, &Query::active().id(id), &update)?;
        debug!(
            "event=resource_update module=write status=ok kind={} id={} found={}",
            self.kind.name,
            id,
            updated.is_some()
        );
        Ok(updated)
    }

    /// Soft-deletes one active resource. A repeat call finds nothing.
    pub fn delete(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        let deleted = self.store.update_row(
            self.kind.name,
            &Query::active().id(id),
            &Update::soft_delete(),
        )?;
        debug!(
            "event=resource_delete module=write status=ok kind={} id={} found={}",
            self.kind.name,
            id,
            deleted.is_some()
        );
        Ok(deleted)
    }

    /// Lists every active resource in insertion order.
    pub fn find_all(&self) -> StoreResult<Vec<Document>> {
        self.store.find_rows(self.kind.name, &Query::active())
    }
}
