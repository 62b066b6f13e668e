//! Document store contract.
//!
//! # Responsibility
//! - Define the storage seam used by write/read models: insert, single and
//!   bulk equality-filtered reads and updates.
//! - Define query and update values that cannot express forbidden writes.
//!
//! # Invariants
//! - `Query::active()` is the default constructor; matching tombstoned rows
//!   requires the explicit `Query::including_deleted()`.
//! - `Update` can set payload fields and raise the tombstone; it has no way to
//!   clear it or to touch other system fields.
//! - Every applied update refreshes `updated_at` to a strictly larger value.

use crate::db::DbError;
use crate::model::document::{is_system_field, Document};
use crate::model::id::ResourceId;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store failures. Always fatal for the current request.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Field name is reserved or not a plain identifier.
    InvalidField(String),
    /// Kind has no relation, so category-scoped operations are unavailable.
    NotHierarchical(&'static str),
    /// Persisted data cannot be converted to a valid document.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidField(field) => write!(f, "invalid document field `{field}`"),
            Self::NotHierarchical(kind) => write!(f, "resource kind `{kind}` has no relation"),
            Self::InvalidData(message) => write!(f, "invalid document data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Id(ResourceId),
    Deleted(bool),
    /// Payload field equality. `Value::Null` also matches an absent field.
    Field { name: String, value: Value },
}

/// Conjunction of equality predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
}

impl Query {
    /// Matches non-deleted rows only.
    pub fn active() -> Self {
        Self {
            filters: vec![Filter::Deleted(false)],
        }
    }

    /// Matches rows regardless of tombstone state. Administrative reads only.
    pub fn including_deleted() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn id(mut self, id: ResourceId) -> Self {
        self.filters.push(Filter::Id(id));
        self
    }

    pub fn field_eq(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

/// Changes applied to matched rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    fields: Map<String, Value>,
    soft_delete: bool,
}

impl Update {
    /// Sets every field of `fields`, leaving other payload fields untouched.
    pub fn merge(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            soft_delete: false,
        }
    }

    /// Raises the tombstone.
    pub fn soft_delete() -> Self {
        Self {
            fields: Map::new(),
            soft_delete: true,
        }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn marks_deleted(&self) -> bool {
        self.soft_delete
    }
}

/// Storage client consumed by the resource models.
///
/// `kind` selects the document collection. Implementations must keep
/// single-row operations atomic; bulk operations may be applied row by row.
pub trait DocumentStore {
    /// Persists a new document with fresh timestamps and `is_deleted=false`.
    fn insert_row(&self, kind: &str, data: &Map<String, Value>) -> StoreResult<Document>;
    /// Returns the first match in insertion order.
    fn find_row(&self, kind: &str, query: &Query) -> StoreResult<Option<Document>>;
    /// Updates the first match in insertion order and returns its new state.
    fn update_row(&self, kind: &str, query: &Query, update: &Update)
        -> StoreResult<Option<Document>>;
    /// Updates every match and returns the matched count.
    fn update_rows(&self, kind: &str, query: &Query, update: &Update) -> StoreResult<usize>;
    /// Returns every match in insertion order.
    fn find_rows(&self, kind: &str, query: &Query) -> StoreResult<Vec<Document>>;
}

/// Rejects field names that are store-managed or not plain identifiers.
pub fn ensure_payload_field(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !plain || is_system_field(name) {
        return Err(StoreError::InvalidField(name.to_string()));
    }
    Ok(())
}
