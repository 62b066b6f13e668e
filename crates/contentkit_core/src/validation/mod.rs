//! Declarative field validation.
//!
//! # Responsibility
//! - Evaluate a JSON object against a schema of named rules.
//! - Report every failing rule, not just the first one.
//!
//! # Invariants
//! - `check` never fails; an empty result means the data passed.
//! - Errors are ordered by schema declaration order, then rule order.

pub mod integrity;
pub mod resource_validator;

use crate::error::{ResourceError, ResourceResult};
use crate::model::kind::FieldRule;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

static RESOURCE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid resource id regex"));

/// Named constraint evaluated against one field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty string.
    NotEmpty,
    /// 24 hex character resource id.
    IsValidId,
    /// Absent, `null`, or a valid resource id.
    OptionalId,
    /// Absent, `null`, or any string.
    NullableString,
}

impl Rule {
    /// Stable rule identifier used in schema declarations.
    pub fn name(self) -> &'static str {
        match self {
            Self::NotEmpty => "notEmpty",
            Self::IsValidId => "isValidId",
            Self::OptionalId => "optionalId",
            Self::NullableString => "nullableString",
        }
    }

    /// Evaluates the rule. `None` means the field is absent.
    pub fn passes(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::NotEmpty, Some(Value::String(text))) => !text.is_empty(),
            (Self::NotEmpty, _) => false,
            (Self::IsValidId, Some(Value::String(text))) => is_valid_id(text),
            (Self::IsValidId, _) => false,
            (Self::OptionalId, None | Some(Value::Null)) => true,
            (Self::OptionalId, Some(Value::String(text))) => is_valid_id(text),
            (Self::OptionalId, _) => false,
            (Self::NullableString, None | Some(Value::Null | Value::String(_))) => true,
            (Self::NullableString, _) => false,
        }
    }
}

/// Returns whether `value` has the store-native identifier shape.
pub fn is_valid_id(value: &str) -> bool {
    RESOURCE_ID_RE.is_match(value)
}

/// One client-facing validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub param: String,
    pub message: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.param, self.message)
    }
}

/// A rule with the param and message reported on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCheck {
    pub rule: Rule,
    pub param: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SchemaField {
    name: String,
    checks: Vec<RuleCheck>,
}

/// Ordered mapping from field name to rule checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from a kind's rule table.
    pub fn from_field_rules<'a>(rules: impl IntoIterator<Item = &'a FieldRule>) -> Self {
        rules.into_iter().fold(Self::new(), |schema, field_rule| {
            schema.rule(field_rule.field, field_rule.rule, field_rule.message)
        })
    }

    /// Adds a rule reported under the field's own name.
    pub fn rule(self, field: &str, rule: Rule, message: impl Into<String>) -> Self {
        let check = RuleCheck {
            rule,
            param: field.to_string(),
            message: message.into(),
        };
        self.check(field, check)
    }

    /// Adds a fully specified check for `field`.
    pub fn check(mut self, field: &str, check: RuleCheck) -> Self {
        match self.fields.iter_mut().find(|entry| entry.name == field) {
            Some(entry) => entry.checks.push(check),
            None => self.fields.push(SchemaField {
                name: field.to_string(),
                checks: vec![check],
            }),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|entry| entry.name.as_str())
    }

    /// Runs `check` and turns a non-empty result into `ResourceError::Validation`.
    pub fn validate(&self, data: &Map<String, Value>) -> ResourceResult<()> {
        let errors = check(data, self);
        if errors.is_empty() {
            return Ok(());
        }
        Err(ResourceError::Validation(errors))
    }
}

/// Evaluates every rule of `schema` against `data`.
pub fn check(data: &Map<String, Value>, schema: &Schema) -> Vec<FieldError> {
    schema
        .fields
        .iter()
        .flat_map(|entry| {
            let value = data.get(&entry.name);
            entry
                .checks
                .iter()
                .filter(move |rule_check| !rule_check.rule.passes(value))
                .map(|rule_check| {
                    FieldError::new(rule_check.param.clone(), rule_check.message.clone())
                })
        })
        .collect()
}
