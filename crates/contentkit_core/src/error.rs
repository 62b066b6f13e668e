//! Resource-level error taxonomy.
//!
//! # Invariants
//! - `Validation` and `NotFound` carry client-facing `{param, message}` items
//!   and are never retried.
//! - `Store` wraps document store failures unchanged.

use crate::repo::StoreError;
use crate::validation::FieldError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResourceResult<T> = Result<T, ResourceError>;

#[derive(Debug)]
pub enum ResourceError {
    /// One or more input shape problems, in schema declaration order.
    Validation(Vec<FieldError>),
    /// Referenced resource is missing or soft-deleted.
    NotFound(FieldError),
    Store(StoreError),
}

impl ResourceError {
    /// Builds the `<kind> not found` error reported against `param`.
    pub fn not_found(param: impl Into<String>, kind: &str) -> Self {
        Self::NotFound(FieldError::new(param, format!("{kind} not found")))
    }

    /// Client-facing error items; empty for store failures.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            Self::NotFound(error) => std::slice::from_ref(error),
            Self::Store(_) => &[],
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => {
                write!(f, "validation failed:")?;
                for error in errors {
                    write!(f, " {error};")?;
                }
                Ok(())
            }
            Self::NotFound(error) => write!(f, "{error}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ResourceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
