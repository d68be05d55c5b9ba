//! Structured generator output: a reply plus the blueprint that illustrates it

use crate::blueprint::{Blueprint, ValidatedBlueprint};
use crate::error::{SchemaError, SchemaErrorKind};
use crate::path::SchemaPath;
use crate::validate::{validate_with, ValidationOptions};
use serde::Serialize;
use serde_json::Value;

/// Key holding the reply text
pub const RESPONSE_KEY: &str = "response";
/// Key holding the blueprint document
pub const BLUEPRINT_KEY: &str = "emograph_blueprint";

/// Validated `{ response, emograph_blueprint }` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub response: String,
    pub blueprint: ValidatedBlueprint,
}

impl OutputDocument {
    /// Validate a combined output document
    ///
    /// Blueprint errors are reported beneath `emograph_blueprint`.
    ///
    /// # Errors
    /// Returns the first hard [`SchemaError`].
    pub fn from_value(raw: &Value, options: &ValidationOptions) -> Result<Self, SchemaError> {
        let root = SchemaPath::root();
        let Some(map) = raw.as_object() else {
            return Err(SchemaError::mismatch(root, "mapping", raw));
        };

        let response = match map.get(RESPONSE_KEY) {
            None | Some(Value::Null) => return Err(SchemaError::missing(root.key(RESPONSE_KEY))),
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(SchemaError::mismatch(root.key(RESPONSE_KEY), "string", other)),
        };

        let prefix = root.key(BLUEPRINT_KEY);
        let document = match map.get(BLUEPRINT_KEY) {
            None | Some(Value::Null) => return Err(SchemaError::missing(prefix)),
            Some(document) => document,
        };
        let blueprint = validate_with(document, options).map_err(|e| e.under(&prefix))?;

        Ok(Self {
            response,
            blueprint,
        })
    }

    /// Parse a combined YAML or JSON output document
    ///
    /// # Errors
    /// Syntax errors surface as [`SchemaErrorKind::TypeMismatch`] at the root.
    pub fn from_yaml(text: &str, options: &ValidationOptions) -> Result<Self, SchemaError> {
        let raw: Value = serde_yaml::from_str(text).map_err(|e| {
            SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                SchemaPath::root(),
                format!("not a YAML document: {e}"),
            )
        })?;
        Self::from_value(&raw, options)
    }
}

#[derive(Serialize)]
struct OutputView<'a> {
    response: &'a str,
    emograph_blueprint: &'a Blueprint,
}

/// Combined raw document for a reply and blueprint
///
/// # Errors
/// Only fails if serialization itself fails.
pub fn to_output_value(response: &str, blueprint: &Blueprint) -> Result<Value, serde_json::Error> {
    serde_json::to_value(OutputView {
        response,
        emograph_blueprint: blueprint,
    })
}
