//! Per-kind input validation for boundary entry points.
//!
//! # Responsibility
//! - Check request shape with the kind's rule table.
//! - Check that the target resource and any referenced parent exist.
//! - Hand back the whitelisted payload for the action layer.
//!
//! # Invariants
//! - Shape errors are reported as one batch before any lookup runs.
//! - Update validates only the fields present in the body (explicit `null`
//!   counts as present).
//! - Relation ids in returned payloads are canonical lowercase hex.
//! - Self-parenting is rejected only when direct; longer cycles such as
//!   A -> B -> A are not detected because the tree is never traversed.

use crate::error::{ResourceError, ResourceResult};
use crate::model::document::Document;
use crate::model::id::ResourceId;
use crate::model::kind::ResourceKind;
use crate::repo::{DocumentStore, StoreError};
use crate::validation::integrity::require_existing;
use crate::validation::{FieldError, Rule, Schema};
use crate::write::WriteModel;
use serde_json::{Map, Value};

const ID_PARAM: &str = "_id";
const MERGE_TARGET_PARAM: &str = "into";

/// Validator for one resource kind.
#[derive(Clone)]
pub struct ResourceValidator<S> {
    model: WriteModel<S>,
}

impl<S: DocumentStore + Clone> ResourceValidator<S> {
    pub fn new(store: S, kind: &'static ResourceKind) -> Self {
        Self {
            model: WriteModel::new(store, kind),
        }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.model.kind()
    }

    /// Validates a create payload and returns its whitelisted projection.
    pub fn create(&self, body: &Value) -> ResourceResult<Map<String, Value>> {
        let body = require_object(body)?;
        Schema::from_field_rules(self.kind().rules).validate(body)?;
        let mut data = self.kind().pick(body);
        self.require_parent(&mut data)?;
        Ok(data)
    }

    /// Validates an id and returns the active resource it names.
    pub fn get_one(&self, id: &str) -> ResourceResult<Document> {
        id_schema().validate(&id_data(id))?;
        require_existing(&self.model, id, ID_PARAM)
    }

    /// Validates a partial update and returns the target id and projection.
    pub fn update(
        &self,
        id: &str,
        body: &Value,
    ) -> ResourceResult<(ResourceId, Map<String, Value>)> {
        let body = require_object(body)?;

        let present_rules = self
            .kind()
            .rules
            .iter()
            .filter(|field_rule| body.contains_key(field_rule.field));
        let schema = present_rules.fold(id_schema(), |schema, field_rule| {
            schema.rule(field_rule.field, field_rule.rule, field_rule.message)
        });

        let mut data = body.clone();
        data.insert(ID_PARAM.to_string(), Value::String(id.to_string()));
        schema.validate(&data)?;

        let target = require_existing(&self.model, id, ID_PARAM)?;
        self.reject_self_parent(target.id, body)?;
        let mut data = self.kind().pick(body);
        self.require_parent(&mut data)?;
        Ok((target.id, data))
    }

    /// Validates a delete request and returns the target id.
    pub fn delete(&self, id: &str) -> ResourceResult<ResourceId> {
        self.get_one(id).map(|document| document.id)
    }

    /// Validates a category id used to list children of this kind.
    pub fn category_id(&self, id: &str) -> ResourceResult<ResourceId> {
        let relation = self
            .kind()
            .relation
            .ok_or(StoreError::NotHierarchical(self.kind().name))?;
        id_schema().validate(&id_data(id))?;

        let parents = WriteModel::new(self.model.store().clone(), relation.target);
        require_existing(&parents, id, ID_PARAM).map(|document| document.id)
    }

    /// Validates merging resource `from` into resource `into`.
    pub fn merge(&self, from: &str, into: &str) -> ResourceResult<(ResourceId, ResourceId)> {
        let mut data = id_data(from);
        data.insert(MERGE_TARGET_PARAM.to_string(), Value::String(into.to_string()));
        id_schema()
            .rule(MERGE_TARGET_PARAM, Rule::IsValidId, "Valid target id required")
            .validate(&data)?;

        let source = require_existing(&self.model, from, ID_PARAM)?;
        let target = require_existing(&self.model, into, MERGE_TARGET_PARAM)?;
        if source.id == target.id {
            return Err(ResourceError::Validation(vec![FieldError::new(
                MERGE_TARGET_PARAM,
                format!("Cannot merge a {} into itself", self.kind().name),
            )]));
        }
        Ok((source.id, target.id))
    }

    /// Checks the relation target, then stores it as the parent's canonical
    /// id. Relation filters compare stored strings exactly.
    fn require_parent(&self, data: &mut Map<String, Value>) -> ResourceResult<()> {
        let Some(relation) = self.kind().relation else {
            return Ok(());
        };
        let parent_id = match data.get(relation.field) {
            Some(Value::String(parent_id)) => parent_id.clone(),
            _ => return Ok(()),
        };

        let parents = WriteModel::new(self.model.store().clone(), relation.target);
        let parent = require_existing(&parents, &parent_id, relation.field)?;
        data.insert(
            relation.field.to_string(),
            Value::String(parent.id.to_string()),
        );
        Ok(())
    }

    /// Rejects direct self-parenting only.
    fn reject_self_parent(
        &self,
        id: ResourceId,
        body: &Map<String, Value>,
    ) -> ResourceResult<()> {
        let Some(relation) = self.kind().relation else {
            return Ok(());
        };
        if relation.target.name != self.kind().name {
            return Ok(());
        }

        let points_at_self = body
            .get(relation.field)
            .and_then(Value::as_str)
            .and_then(|value| ResourceId::parse_str(value).ok())
            == Some(id);
        if points_at_self {
            return Err(ResourceError::Validation(vec![FieldError::new(
                relation.field,
                format!("A {} cannot be its own parent", self.kind().name),
            )]));
        }
        Ok(())
    }
}

fn id_schema() -> Schema {
    Schema::new().rule(ID_PARAM, Rule::IsValidId, "Valid id required")
}

fn id_data(id: &str) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(ID_PARAM.to_string(), Value::String(id.to_string()));
    data
}

fn require_object(body: &Value) -> ResourceResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        ResourceError::Validation(vec![FieldError::new("body", "JSON object required")])
    })
}
