//! Transport-agnostic boundary entry points.
//!
//! # Responsibility
//! - Validate input, invoke actions, and shape the outcome as a status code
//!   plus JSON body.
//!
//! # Invariants
//! - Validation failures map to 400 and not-found failures to 404, both with
//!   a `[{param, message}]` body.
//! - Store failures map to 500 with a generic body; details go to the log
//!   only.
//! - Entry points never panic.

use crate::error::{ResourceError, ResourceResult};
use crate::model::document::Document;
use crate::read::ReadModel;
use crate::repo::{DocumentStore, StoreError};
use crate::service::category_action::{CascadeOutcome, CategoryAction};
use crate::service::resource_action::ResourceAction;
use crate::validation::resource_validator::ResourceValidator;
use log::error;
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Response envelope handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn from_error(operation: &str, err: &ResourceError) -> Self {
        match err {
            ResourceError::Validation(_) => Self {
                status: STATUS_BAD_REQUEST,
                body: errors_body(err),
            },
            ResourceError::NotFound(_) => Self {
                status: STATUS_NOT_FOUND,
                body: errors_body(err),
            },
            ResourceError::Store(store_err) => {
                error!(
                    "event=endpoint module=endpoint status=error operation={} error_code=store_failure error={}",
                    operation, store_err
                );
                Self {
                    status: STATUS_INTERNAL_ERROR,
                    body: json!({ "message": "Internal server error" }),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// CRUD entry points for one resource kind.
pub struct ResourceEndpoints<'a, S, R> {
    validator: &'a ResourceValidator<S>,
    action: &'a ResourceAction<S, R>,
}

impl<'a, S, R> ResourceEndpoints<'a, S, R>
where
    S: DocumentStore + Clone,
    R: ReadModel,
{
    pub fn new(validator: &'a ResourceValidator<S>, action: &'a ResourceAction<S, R>) -> Self {
        Self { validator, action }
    }

    pub fn create(&self, body: &Value) -> ApiResponse {
        respond("create", STATUS_CREATED, || {
            let data = self.validator.create(body)?;
            Ok(self.action.create(&data)?.to_json()?)
        })
    }

    pub fn get_one(&self, id: &str) -> ApiResponse {
        respond("get_one", STATUS_OK, || {
            let id = self.validator.get_one(id)?.id;
            let document = self.action.get_one(id)?;
            self.found(document)
        })
    }

    pub fn get_all(&self) -> ApiResponse {
        respond("get_all", STATUS_OK, || {
            documents_body(&self.action.get_all()?)
        })
    }

    /// Lists children of the parent named by `category_id`.
    pub fn get_by_category(&self, category_id: &str) -> ApiResponse {
        respond("get_by_category", STATUS_OK, || {
            let category_id = self.validator.category_id(category_id)?;
            documents_body(&self.action.get_by_category(category_id)?)
        })
    }

    pub fn update(&self, id: &str, body: &Value) -> ApiResponse {
        respond("update", STATUS_OK, || {
            let (id, data) = self.validator.update(id, body)?;
            let document = self.action.update(id, &data)?;
            self.found(document)
        })
    }

    pub fn delete(&self, id: &str) -> ApiResponse {
        respond("delete", STATUS_OK, || {
            let id = self.validator.delete(id)?;
            let document = self.action.delete(id)?;
            self.found(document)
        })
    }

    fn found(&self, document: Option<Document>) -> ResourceResult<Value> {
        match document {
            Some(document) => Ok(document.to_json()?),
            None => Err(ResourceError::not_found("_id", self.validator.kind().name)),
        }
    }
}

/// Category entry points. Deletion always cascades to dependents.
pub struct CategoryEndpoints<S, R> {
    validator: ResourceValidator<S>,
    action: CategoryAction<S, R>,
}

impl<S, R> CategoryEndpoints<S, R>
where
    S: DocumentStore + Clone,
    R: ReadModel,
{
    pub fn new(validator: ResourceValidator<S>, action: CategoryAction<S, R>) -> Self {
        Self { validator, action }
    }

    pub fn create(&self, body: &Value) -> ApiResponse {
        self.plain().create(body)
    }

    pub fn get_one(&self, id: &str) -> ApiResponse {
        self.plain().get_one(id)
    }

    pub fn get_all(&self) -> ApiResponse {
        self.plain().get_all()
    }

    /// Lists direct subcategories of `parent_id`.
    pub fn get_by_category(&self, parent_id: &str) -> ApiResponse {
        self.plain().get_by_category(parent_id)
    }

    pub fn update(&self, id: &str, body: &Value) -> ApiResponse {
        self.plain().update(id, body)
    }

    /// Deletes a category and every dependent pointing at it.
    pub fn delete(&self, id: &str) -> ApiResponse {
        respond("category_delete", STATUS_OK, || {
            let id = self.validator.delete(id)?;
            let outcome = self.action.delete(id)?;
            self.cascade_body(outcome)
        })
    }

    /// Moves dependents of `from` to `into`, then deletes `from`.
    pub fn merge(&self, from: &str, into: &str) -> ApiResponse {
        respond("category_merge", STATUS_OK, || {
            let (from, into) = self.validator.merge(from, into)?;
            let outcome = self.action.merge(from, into)?;
            self.cascade_body(outcome)
        })
    }

    /// Non-deleting entry points shared with other kinds.
    fn plain(&self) -> ResourceEndpoints<'_, S, R> {
        ResourceEndpoints::new(&self.validator, self.action.resources())
    }

    fn cascade_body(&self, outcome: Option<CascadeOutcome>) -> ResourceResult<Value> {
        let outcome =
            outcome.ok_or_else(|| ResourceError::not_found("_id", self.validator.kind().name))?;
        Ok(json!({
            "category": outcome.category.to_json()?,
            "affected": outcome.affected,
        }))
    }
}

fn respond(
    operation: &str,
    success_status: u16,
    run: impl FnOnce() -> ResourceResult<Value>,
) -> ApiResponse {
    match run() {
        Ok(body) => ApiResponse {
            status: success_status,
            body,
        },
        Err(err) => ApiResponse::from_error(operation, &err),
    }
}

fn errors_body(err: &ResourceError) -> Value {
    serde_json::to_value(err.field_errors()).unwrap_or_else(|_| json!([]))
}

fn documents_body(documents: &[Document]) -> ResourceResult<Value> {
    let body = serde_json::to_value(documents)
        .map_err(|err| StoreError::InvalidData(format!("unserializable document list: {err}")))?;
    Ok(body)
}
