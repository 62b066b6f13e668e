//! Category lifecycle with cascades onto dependent resources.
//!
//! # Responsibility
//! - Delete a category and tombstone its children.
//! - Merge one category into another, moving its children first.
//!
//! # Invariants
//! - Cascades are best-effort bulk statements with no rollback.
//! - Subcategories are not traversed; only direct children of the dependent
//!   kind are touched.

use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::read::ReadModel;
use crate::repo::{DocumentStore, StoreError, StoreResult};
use crate::service::resource_action::ResourceAction;
use crate::write::WriteModel;
use log::info;

/// Result of a category lifecycle change.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// Category state after the change.
    pub category: Document,
    /// Number of dependent rows rewritten or tombstoned.
    pub affected: usize,
}

/// Category actions with cascading effects on a dependent kind.
pub struct CategoryAction<S, R> {
    categories: ResourceAction<S, R>,
    dependents: WriteModel<S>,
}

impl<S: DocumentStore, R: ReadModel> CategoryAction<S, R> {
    /// Creates the action.
    ///
    /// # Errors
    /// - `StoreError::NotHierarchical` when `dependents` has no relation to the
    ///   category kind.
    pub fn try_new(
        categories: ResourceAction<S, R>,
        dependents: WriteModel<S>,
    ) -> StoreResult<Self> {
        let category_kind = categories.write_model().kind().name;
        let linked = dependents
            .kind()
            .relation
            .is_some_and(|relation| relation.target.name == category_kind);
        if !linked {
            return Err(StoreError::NotHierarchical(dependents.kind().name));
        }
        Ok(Self {
            categories,
            dependents,
        })
    }

    /// Plain CRUD over categories. Its `delete` does not cascade; boundary
    /// code deletes through [`Self::delete`].
    pub fn resources(&self) -> &ResourceAction<S, R> {
        &self.categories
    }

    /// Soft-deletes the category, then every dependent pointing at it.
    ///
    /// Returns `None` without cascading when the category was not active.
    pub fn delete(&self, id: ResourceId) -> StoreResult<Option<CascadeOutcome>> {
        let Some(category) = self.categories.delete(id)? else {
            return Ok(None);
        };
        let affected = self.dependents.delete_by_category_id(id)?;
        info!(
            "event=category_delete module=service status=ok id={} cascaded={}",
            id, affected
        );
        Ok(Some(CascadeOutcome { category, affected }))
    }

    /// Moves every dependent of `from` to `into`, then soft-deletes `from`.
    pub fn merge(
        &self,
        from: ResourceId,
        into: ResourceId,
    ) -> StoreResult<Option<CascadeOutcome>> {
        if self.categories.get_one(from)?.is_none() {
            return Ok(None);
        }
        let affected = self.dependents.update_category_id(from, into)?;
        let Some(category) = self.categories.delete(from)? else {
            return Ok(None);
        };
        info!(
            "event=category_merge module=service status=ok from={} into={} moved={}",
            from, into, affected
        );
        Ok(Some(CascadeOutcome { category, affected }))
    }
}
