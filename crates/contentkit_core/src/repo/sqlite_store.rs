//! SQLite-backed document store.
//!
//! # Responsibility
//! - Implement `DocumentStore` over the `documents` table.
//! - Keep SQL and JSON payload handling inside the persistence boundary.
//!
//! # Invariants
//! - Payload filters compile to `json_extract(payload, '$.<field>')` with the
//!   field name validated as a plain identifier, so relation indexes apply.
//! - `updated_at` is set to `MAX(now, updated_at + 1)` on every update.
//! - Reads return rows in insertion (`rowid`) order.

use crate::db::migrations::{latest_version, schema_version};
use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::repo::document_store::{
    ensure_payload_field, DocumentStore, Filter, Query, StoreError, StoreResult, Update,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const DOCUMENT_COLUMNS: &str = "id, payload, is_deleted, created_at, updated_at";

/// SQLite document store over a migrated connection.
#[derive(Clone, Copy)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Creates a store from a connection returned by `open_db*`.
    ///
    /// # Errors
    /// - `StoreError::UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version = schema_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn insert_row(&self, kind: &str, data: &Map<String, Value>) -> StoreResult<Document> {
        for field in data.keys() {
            ensure_payload_field(field)?;
        }

        let id = ResourceId::new();
        let now = now_epoch_ms();
        let payload = serde_json::to_string(data)
            .map_err(|err| StoreError::InvalidData(format!("unserializable payload: {err}")))?;

        self.conn.execute(
            "INSERT INTO documents (
                id,
                kind,
                payload,
                is_deleted,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?4);",
            params![id.to_string(), kind, payload, now],
        )?;

        Ok(Document {
            id,
            fields: data.clone(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    fn find_row(&self, kind: &str, query: &Query) -> StoreResult<Option<Document>> {
        let (condition, binds) = where_clause(kind, query)?;
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS}
             FROM documents
             WHERE {condition}
             ORDER BY rowid ASC
             LIMIT 1;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let raw = stmt
            .query_row(params_from_iter(binds), read_document_row)
            .optional()?;
        raw.map(parse_document_row).transpose()
    }

    fn update_row(
        &self,
        kind: &str,
        query: &Query,
        update: &Update,
    ) -> StoreResult<Option<Document>> {
        let (assignments, mut binds) = set_clause(update)?;
        let (condition, where_binds) = where_clause(kind, query)?;
        binds.extend(where_binds);

        let sql = format!(
            "UPDATE documents
             SET {assignments}
             WHERE rowid = (
                SELECT rowid
                FROM documents
                WHERE {condition}
                ORDER BY rowid ASC
                LIMIT 1
             )
             RETURNING {DOCUMENT_COLUMNS};"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let raw = stmt
            .query_row(params_from_iter(binds), read_document_row)
            .optional()?;
        raw.map(parse_document_row).transpose()
    }

    fn update_rows(&self, kind: &str, query: &Query, update: &Update) -> StoreResult<usize> {
        let (assignments, mut binds) = set_clause(update)?;
        let (condition, where_binds) = where_clause(kind, query)?;
        binds.extend(where_binds);

        let sql = format!(
            "UPDATE documents
             SET {assignments}
             WHERE {condition};"
        );
        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed)
    }

    fn find_rows(&self, kind: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let (condition, binds) = where_clause(kind, query)?;
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS}
             FROM documents
             WHERE {condition}
             ORDER BY rowid ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(read_document_row(row)?)?);
        }
        Ok(documents)
    }
}

struct DocumentRow {
    id: String,
    payload: String,
    is_deleted: i64,
    created_at: i64,
    updated_at: i64,
}

fn read_document_row(row: &Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get("id")?,
        payload: row.get("payload")?,
        is_deleted: row.get("is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_document_row(raw: DocumentRow) -> StoreResult<Document> {
    let id = ResourceId::parse_str(&raw.id).map_err(|err| {
        StoreError::InvalidData(format!("invalid id `{}` in documents.id: {err}", raw.id))
    })?;

    let fields = serde_json::from_str::<Map<String, Value>>(&raw.payload).map_err(|err| {
        StoreError::InvalidData(format!("invalid payload for document {id}: {err}"))
    })?;

    let is_deleted = match raw.is_deleted {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_deleted value `{other}` in documents.is_deleted"
            )));
        }
    };

    Ok(Document {
        id,
        fields,
        is_deleted,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

fn where_clause(kind: &str, query: &Query) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut condition = String::from("kind = ?");
    let mut binds = vec![SqlValue::Text(kind.to_string())];

    for filter in query.filters() {
        match filter {
            Filter::Id(id) => {
                condition.push_str(" AND id = ?");
                binds.push(SqlValue::Text(id.to_string()));
            }
            Filter::Deleted(flag) => {
                condition.push_str(" AND is_deleted = ?");
                binds.push(SqlValue::Integer(bool_to_int(*flag)));
            }
            Filter::Field { name, value } => {
                ensure_payload_field(name)?;
                match json_to_sql(value)? {
                    Some(bound) => {
                        condition.push_str(&format!(" AND json_extract(payload, '$.{name}') = ?"));
                        binds.push(bound);
                    }
                    None => {
                        condition.push_str(&format!(" AND json_extract(payload, '$.{name}') IS NULL"));
                    }
                }
            }
        }
    }

    Ok((condition, binds))
}

fn set_clause(update: &Update) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut assignments = Vec::new();
    let mut binds = Vec::new();

    if !update.fields().is_empty() {
        let mut json_set = String::from("payload = json_set(payload");
        for (name, value) in update.fields() {
            ensure_payload_field(name)?;
            json_set.push_str(&format!(", '$.{name}', json(?)"));
            let encoded = serde_json::to_string(value).map_err(|err| {
                StoreError::InvalidData(format!("unserializable value for `{name}`: {err}"))
            })?;
            binds.push(SqlValue::Text(encoded));
        }
        json_set.push(')');
        assignments.push(json_set);
    }

    if update.marks_deleted() {
        assignments.push("is_deleted = 1".to_string());
    }

    assignments.push("updated_at = MAX(?, updated_at + 1)".to_string());
    binds.push(SqlValue::Integer(now_epoch_ms()));

    Ok((assignments.join(", "), binds))
}

fn json_to_sql(value: &Value) -> StoreResult<Option<SqlValue>> {
    let bound = match value {
        Value::Null => return Ok(None),
        Value::Bool(flag) => SqlValue::Integer(bool_to_int(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(
            serde_json::to_string(value)
                .map_err(|err| StoreError::InvalidData(format!("unserializable filter: {err}")))?,
        ),
    };
    Ok(Some(bound))
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
