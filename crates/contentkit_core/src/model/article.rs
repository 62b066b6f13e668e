//! Article resource kind.
//!
//! # Invariants
//! - `categoryId` is required and must point at an active category when
//!   validated; storage does not enforce the reference.
//! - `text` and `description` are nullable and default to `null`.

use crate::model::category::CATEGORY;
use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::model::kind::{FieldRule, Relation, ResourceKind};
use crate::repo::StoreError;
use crate::validation::Rule;
use serde::{Deserialize, Serialize};

pub static ARTICLE: ResourceKind = ResourceKind {
    name: "article",
    params: &["name", "categoryId", "text", "description"],
    rules: &[
        FieldRule {
            field: "name",
            rule: Rule::NotEmpty,
            message: "Name is required",
        },
        FieldRule {
            field: "categoryId",
            rule: Rule::IsValidId,
            message: "Valid category id required",
        },
        FieldRule {
            field: "text",
            rule: Rule::NullableString,
            message: "Text must be a string or null",
        },
        FieldRule {
            field: "description",
            rule: Rule::NullableString,
            message: "Description must be a string or null",
        },
    ],
    relation: Some(Relation {
        field: "categoryId",
        target: &CATEGORY,
    }),
};

/// Typed view over an article document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    pub category_id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Article {
    /// Converts a generic document into an article.
    ///
    /// # Errors
    /// - `StoreError::InvalidData` when the payload does not have article shape.
    pub fn from_document(document: &Document) -> Result<Self, StoreError> {
        serde_json::from_value(document.to_json()?).map_err(|err| {
            StoreError::InvalidData(format!("document {} is not an article: {err}", document.id))
        })
    }
}
