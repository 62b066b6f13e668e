//! Resource action use-case layer.
//!
//! # Responsibility
//! - Run writes through the write model, then notify the read projection.
//! - Expose write-path reads and separate, possibly stale, read-path reads.
//!
//! # Invariants
//! - Inputs are assumed validated by `ResourceValidator`.
//! - The read projection is notified only after a write matched a row.

use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::read::{Projection, ReadModel};
use crate::repo::{DocumentStore, StoreResult};
use crate::write::WriteModel;
use serde_json::{Map, Value};

/// CRUD orchestration over one write model and its read projection.
pub struct ResourceAction<S, R> {
    write: WriteModel<S>,
    read: R,
}

impl<S: DocumentStore, R: ReadModel> ResourceAction<S, R> {
    pub fn new(write: WriteModel<S>, read: R) -> Self {
        Self { write, read }
    }

    pub fn write_model(&self) -> &WriteModel<S> {
        &self.write
    }

    pub fn read_model(&self) -> &R {
        &self.read
    }

    pub fn create(&self, body: &Map<String, Value>) -> StoreResult<Document> {
        let document = self.write.create(body)?;
        self.read.project(Projection::Created(&document))?;
        Ok(document)
    }

    /// Lists active resources from the write path.
    pub fn get_all(&self) -> StoreResult<Vec<Document>> {
        self.write.find_all()
    }

    /// Lists active resources from the read projection.
    pub fn get_all_read(&self) -> StoreResult<Vec<Document>> {
        self.read.find_all()
    }

    pub fn get_one(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        self.write.find_by_id(id)
    }

    pub fn get_one_read(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        self.read.find_by_id(id)
    }

    /// Lists active children of a category from the write path.
    pub fn get_by_category(&self, category_id: ResourceId) -> StoreResult<Vec<Document>> {
        self.write.find_by_category_id(category_id)
    }

    pub fn update(
        &self,
        id: ResourceId,
        body: &Map<String, Value>,
    ) -> StoreResult<Option<Document>> {
        let updated = self.write.update(id, body)?;
        if let Some(document) = updated.as_ref() {
            self.read.project(Projection::Updated(document))?;
        }
        Ok(updated)
    }

    pub fn delete(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        let deleted = self.write.delete(id)?;
        if let Some(document) = deleted.as_ref() {
            self.read.project(Projection::Deleted(document))?;
        }
        Ok(deleted)
    }
}
