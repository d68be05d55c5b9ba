//! Error and warning types for blueprint validation
//!
//! Hard failures are [`SchemaError`]s and abort validation at the first one
//! found. Soft findings are [`SchemaWarning`]s attached to the validated result.

use crate::geometry::Position;
use crate::path::SchemaPath;
use std::fmt;

/// Classification of a hard schema failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaErrorKind {
    /// Required field absent (or null)
    MissingField,
    /// Value has the wrong type, or a discriminant is unknown
    TypeMismatch,
    /// Arrow endpoint names an id not present in the blueprint
    UnresolvedReference,
    /// Numeric value outside its permitted range
    OutOfRange,
    /// Two elements share an id
    DuplicateId,
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingField => "missing field",
            Self::TypeMismatch => "type mismatch",
            Self::UnresolvedReference => "unresolved reference",
            Self::OutOfRange => "out of range",
            Self::DuplicateId => "duplicate id",
        };
        f.write_str(name)
    }
}

/// Hard validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {path}: {detail}")]
pub struct SchemaError {
    /// Failure class
    pub kind: SchemaErrorKind,
    /// Where in the document it happened
    pub path: SchemaPath,
    /// Human-readable explanation
    pub detail: String,
}

impl SchemaError {
    /// Create a new schema error
    #[inline]
    pub fn new(kind: SchemaErrorKind, path: SchemaPath, detail: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            detail: detail.into(),
        }
    }

    pub(crate) fn missing(path: SchemaPath) -> Self {
        Self::new(SchemaErrorKind::MissingField, path, "required field is absent")
    }

    pub(crate) fn mismatch(path: SchemaPath, expected: &str, found: &serde_json::Value) -> Self {
        Self::new(
            SchemaErrorKind::TypeMismatch,
            path,
            format!("expected {expected}, found {}", describe(found)),
        )
    }

    pub(crate) fn out_of_range(path: SchemaPath, detail: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::OutOfRange, path, detail)
    }

    /// Re-root this error beneath `prefix`
    #[must_use]
    pub fn under(mut self, prefix: &SchemaPath) -> Self {
        self.path = self.path.under(prefix);
        self
    }
}

/// Soft finding attached to a validated blueprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    /// An arrow endpoint lies away from the element it references
    ArrowEndpointMismatch {
        /// Path of the offending arrow endpoint
        path: SchemaPath,
        /// Referenced element id
        target_id: String,
        /// Stored endpoint
        endpoint: Position,
    },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrowEndpointMismatch {
                path,
                target_id,
                endpoint,
            } => write!(
                f,
                "{path}: endpoint ({}, {}) is not on element '{target_id}'",
                endpoint.x, endpoint.y
            ),
        }
    }
}

fn describe(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "sequence",
        serde_json::Value::Object(_) => "mapping",
    }
}
