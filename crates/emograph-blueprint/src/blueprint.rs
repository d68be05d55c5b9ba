//! The scene blueprint document

use crate::element::Element;
use crate::error::{SchemaError, SchemaErrorKind, SchemaWarning};
use crate::path::SchemaPath;
use crate::validate::{validate_with, ValidationOptions};
use serde::Serialize;

/// Full description of a 2D scene
///
/// Element order is render order: later elements draw over earlier ones.
/// Fields are public and unchecked; the schema invariants (unique ids,
/// resolvable arrows, positive sizes) are guaranteed only for values obtained
/// through [`crate::validate`] or the `from_*` constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blueprint {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_font_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji_font_path: Option<String>,
    pub elements: Vec<Element>,
}

impl Blueprint {
    /// Look up an element by id
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == Some(id))
    }

    /// Raw document form of this blueprint
    ///
    /// # Errors
    /// Only fails if serialization itself fails, which the derived impls do not.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serialize to YAML, preserving field order and leaving Unicode unescaped
    ///
    /// # Errors
    /// Propagates emitter failures from `serde_yaml`.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    /// YAML syntax errors surface as [`SchemaErrorKind::TypeMismatch`] at the root;
    /// everything else as reported by [`crate::validate`].
    pub fn from_yaml(text: &str) -> Result<ValidatedBlueprint, SchemaError> {
        let raw: serde_json::Value = serde_yaml::from_str(text).map_err(|e| {
            SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                SchemaPath::root(),
                format!("not a YAML document: {e}"),
            )
        })?;
        validate_with(&raw, &ValidationOptions::default())
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    /// As for [`Blueprint::from_yaml`].
    pub fn from_json(text: &str) -> Result<ValidatedBlueprint, SchemaError> {
        let raw: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            SchemaError::new(
                SchemaErrorKind::TypeMismatch,
                SchemaPath::root(),
                format!("not a JSON document: {e}"),
            )
        })?;
        validate_with(&raw, &ValidationOptions::default())
    }
}

/// A blueprint that passed validation, with any soft findings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBlueprint {
    pub blueprint: Blueprint,
    pub warnings: Vec<SchemaWarning>,
}

impl ValidatedBlueprint {
    /// Discard warnings
    #[inline]
    #[must_use]
    pub fn into_blueprint(self) -> Blueprint {
        self.blueprint
    }

    /// Check if validation produced no warnings
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HAPPY_SAD: &str = r##"
width: 400
height: 200
background_color: "#ffffff"
elements:
  - type: emoji
    id: happy
    emoji: "😀"
    position: {x: 50, y: 50}
    size: 64
    caption:
      content: うれしい
      position: {x: 50, y: 130}
      font_size: 16
      color: black
  - type: emoji
    id: sad
    emoji: "😢"
    position: {x: 280, y: 50}
    size: 64
  - type: arrow
    start_id: happy
    end_id: sad
    color: gray
    position:
      start: {x: 114, y: 82}
      end: {x: 280, y: 82}
    thickness: 3
"##;

    #[test]
    fn yaml_round_trip_is_lossless() {
        let first = Blueprint::from_yaml(HAPPY_SAD).unwrap();
        assert!(first.is_clean(), "{:?}", first.warnings);

        let yaml = first.blueprint.to_yaml().unwrap();
        let second = Blueprint::from_yaml(&yaml).unwrap();
        assert_eq!(first.blueprint, second.blueprint);
    }

    #[test]
    fn yaml_keeps_unicode_and_key_order() {
        let validated = Blueprint::from_yaml(HAPPY_SAD).unwrap();
        let yaml = validated.blueprint.to_yaml().unwrap();

        assert!(yaml.contains("😀"));
        assert!(yaml.contains("うれしい"));
        let width_at = yaml.find("width").unwrap();
        let elements_at = yaml.find("elements").unwrap();
        assert!(width_at < elements_at);
    }

    #[test]
    fn json_and_yaml_agree() {
        let from_yaml = Blueprint::from_yaml(HAPPY_SAD).unwrap().into_blueprint();
        let json = serde_json::to_string(&from_yaml).unwrap();
        let from_json = Blueprint::from_json(&json).unwrap().into_blueprint();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn element_lookup() {
        let bp = Blueprint::from_yaml(HAPPY_SAD).unwrap().into_blueprint();
        assert_eq!(bp.element("sad").map(Element::type_name), Some("emoji"));
        assert!(bp.element("missing").is_none());
    }

    #[test]
    fn broken_yaml_is_type_mismatch_at_root() {
        let err = Blueprint::from_yaml("width: [1, 2").unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::TypeMismatch);
        assert!(err.path.is_root());
    }
}
