//! Relational integrity checks.
//!
//! Confirms that an identifier points at an active resource of the expected
//! kind. References are not enforced by storage, so every write that carries
//! one goes through here first.

use crate::error::{ResourceError, ResourceResult};
use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::repo::{DocumentStore, StoreResult};
use crate::write::WriteModel;
use log::debug;

/// Lookup used by integrity checks; usually a write model of the target kind.
pub trait ResourceLookup {
    fn kind_name(&self) -> &'static str;
    fn lookup(&self, id: ResourceId) -> StoreResult<Option<Document>>;
}

impl<S: DocumentStore> ResourceLookup for WriteModel<S> {
    fn kind_name(&self) -> &'static str {
        self.kind().name
    }

    fn lookup(&self, id: ResourceId) -> StoreResult<Option<Document>> {
        self.find_by_id(id)
    }
}

/// Returns the active resource `id` points at.
///
/// # Errors
/// - `ResourceError::NotFound` reported against `param` when the id does not
///   parse, the lookup finds nothing, or the row is soft-deleted.
/// - `ResourceError::Store` when the lookup fails.
pub fn require_existing(
    lookup: &impl ResourceLookup,
    id: &str,
    param: &str,
) -> ResourceResult<Document> {
    let kind = lookup.kind_name();
    let found = match ResourceId::parse_str(id) {
        Ok(parsed) => lookup.lookup(parsed)?,
        Err(_) => None,
    };

    match found {
        Some(document) if document.is_active() => Ok(document),
        _ => {
            debug!(
                "event=integrity_check module=validation status=not_found kind={} param={}",
                kind, param
            );
            Err(ResourceError::not_found(param, kind))
        }
    }
}
