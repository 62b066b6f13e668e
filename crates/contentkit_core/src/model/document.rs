//! Generic stored document.

use crate::model::id::ResourceId;
use crate::repo::StoreError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields managed by the store; never accepted from client payloads.
pub const SYSTEM_FIELDS: &[&str] = &["_id", "isDeleted", "createdAt", "updatedAt"];

/// Returns whether `field` is store-managed.
pub fn is_system_field(field: &str) -> bool {
    SYSTEM_FIELDS.contains(&field)
}

/// One persisted resource of any kind.
///
/// Serializes as `{_id, <payload fields>, isDeleted, createdAt, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: ResourceId,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Soft delete tombstone. Never reverts to `false`.
    pub is_deleted: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the payload field as a string slice when it holds one.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Serializes into the client-visible JSON shape.
    pub fn to_json(&self) -> Result<Value, StoreError> {
        serde_json::to_value(self).map_err(|err| {
            StoreError::InvalidData(format!("document {} is not serializable: {err}", self.id))
        })
    }
}
