//! Data-driven resource kind configuration.
//!
//! # Responsibility
//! - Describe one resource kind: name, client-writable whitelist, validation
//!   rule table and optional parent relation.
//! - Project client payloads onto the whitelist.
//!
//! # Invariants
//! - System fields (`_id`, `isDeleted`, `createdAt`, `updatedAt`) are never
//!   part of a whitelist.
//! - A kind configuration is static; engines hold `&'static ResourceKind`.

use crate::validation::Rule;
use serde_json::{Map, Value};
use std::fmt::{Debug, Formatter};

/// One declarative validation rule bound to a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

/// Many-to-one link from a child kind to its parent kind.
#[derive(Clone, Copy)]
pub struct Relation {
    /// Payload field holding the parent id.
    pub field: &'static str,
    /// Kind the field must point at.
    pub target: &'static ResourceKind,
}

impl Debug for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("field", &self.field)
            .field("target", &self.target.name)
            .finish()
    }
}

/// Static configuration injected into the generic write model and validator.
#[derive(Debug, Clone, Copy)]
pub struct ResourceKind {
    /// Storage kind name, also used in not-found messages.
    pub name: &'static str,
    /// Whitelisted payload fields.
    pub params: &'static [&'static str],
    /// Rules checked on create, and on update for fields present in the body.
    pub rules: &'static [FieldRule],
    pub relation: Option<Relation>,
}

impl ResourceKind {
    /// Returns whether `field` is client-writable for this kind.
    pub fn accepts(&self, field: &str) -> bool {
        self.params.contains(&field)
    }

    /// Keeps only whitelisted fields present in `body`.
    pub fn pick(&self, body: &Map<String, Value>) -> Map<String, Value> {
        self.params
            .iter()
            .filter_map(|param| {
                body.get(*param)
                    .map(|value| ((*param).to_string(), value.clone()))
            })
            .collect()
    }

    /// Like [`Self::pick`], but absent whitelisted fields become `null`.
    pub fn pick_with_defaults(&self, body: &Map<String, Value>) -> Map<String, Value> {
        self.params
            .iter()
            .map(|param| {
                let value = body.get(*param).cloned().unwrap_or(Value::Null);
                ((*param).to_string(), value)
            })
            .collect()
    }

    /// Returns the relation field name, if this kind has a parent kind.
    pub fn relation_field(&self) -> Option<&'static str> {
        self.relation.map(|relation| relation.field)
    }
}
