//! Category-scoped bulk operations for kinds that have a parent relation.
//!
//! These run without per-document validation and without a transaction: a
//! failure part way through leaves the already-rewritten rows in place.

use super::WriteModel;
use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::repo::{DocumentStore, Query, StoreError, StoreResult, Update};
use log::{debug, info};

impl<S: DocumentStore> WriteModel<S> {
    /// Lists active children of `category_id`.
    pub fn find_by_category_id(&self, category_id: ResourceId) -> StoreResult<Vec<Document>> {
        let field = self.relation_field()?;
        self.store.find_rows(self.kind.name, &children_of(field, category_id))
    }

    /// Points every active child of `category_id` at `new_category_id`.
    ///
    /// Returns the number of rewritten rows.
    pub fn update_category_id(
        &self,
        category_id: ResourceId,
        new_category_id: ResourceId,
    ) -> StoreResult<usize> {
        let field = self.relation_field()?;
        let update = Update::default().set(field, new_category_id.to_string());
        let changed =
            self.store
                .update_rows(self.kind.name, &children_of(field, category_id), &update)?;
        info!(
            "event=cascade_reassign module=write status=ok kind={} from={} to={} affected={}",
            self.kind.name, category_id, new_category_id, changed
        );
        Ok(changed)
    }

    /// Soft-deletes every active child of `category_id`.
    ///
    /// Returns the number of tombstoned rows.
    pub fn delete_by_category_id(&self, category_id: ResourceId) -> StoreResult<usize> {
        let field = self.relation_field()?;
        let changed = self.store.update_rows(
            self.kind.name,
            &children_of(field, category_id),
            &Update::soft_delete(),
        )?;
        info!(
            "event=cascade_delete module=write status=ok kind={} category={} affected={}",
            self.kind.name, category_id, changed
        );
        Ok(changed)
    }

    fn relation_field(&self) -> StoreResult<&'static str> {
        self.kind.relation_field().ok_or_else(|| {
            debug!(
                "event=relation_lookup module=write status=error kind={} error_code=not_hierarchical",
                self.kind.name
            );
            StoreError::NotHierarchical(self.kind.name)
        })
    }
}

fn children_of(field: &str, category_id: ResourceId) -> Query {
    Query::active().field_eq(field, category_id.to_string())
}
