//! Category resource kind.
//!
//! Categories form a tree through the nullable `parent` field. Traversal of
//! that tree is left to callers; this crate only checks direct references.

use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::model::kind::{FieldRule, Relation, ResourceKind};
use crate::repo::StoreError;
use crate::validation::Rule;
use serde::{Deserialize, Serialize};

pub static CATEGORY: ResourceKind = ResourceKind {
    name: "category",
    params: &["name", "parent"],
    rules: &[
        FieldRule {
            field: "name",
            rule: Rule::NotEmpty,
            message: "Name is required",
        },
        FieldRule {
            field: "parent",
            rule: Rule::OptionalId,
            message: "Valid parent id required",
        },
    ],
    relation: Some(Relation {
        field: "parent",
        target: &CATEGORY,
    }),
};

/// Typed view over a category document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub name: String,
    /// `None` for root categories.
    #[serde(default)]
    pub parent: Option<ResourceId>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Category {
    pub fn from_document(document: &Document) -> Result<Self, StoreError> {
        serde_json::from_value(document.to_json()?).map_err(|err| {
            StoreError::InvalidData(format!("document {} is not a category: {err}", document.id))
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
