//! Schema validation for raw blueprint documents
//!
//! Walks a `serde_json::Value` once, building typed elements as it goes and
//! stopping at the first hard error. Arrow references are resolved after the
//! walk so arrows may point at elements that appear later in the sequence.
//! Endpoint consistency is only ever reported as a [`SchemaWarning`].

use crate::blueprint::{Blueprint, ValidatedBlueprint};
use crate::element::{
    ArrowElement, Caption, Element, EmojiElement, ShapeElement, ShapeGeometry, ShapeKind,
    TextElement,
};
use crate::error::{SchemaError, SchemaErrorKind, SchemaWarning};
use crate::geometry::{CircleSize, LinePosition, Position, RectangleSize};
use crate::path::SchemaPath;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Tunables for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Pixels an arrow endpoint may sit outside its target's bounding box
    /// before a mismatch warning is raised
    pub arrow_slack: u32,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { arrow_slack: 16 }
    }
}

/// Validate a raw document with default options
///
/// # Errors
/// Returns the first hard [`SchemaError`] encountered.
pub fn validate(raw: &Value) -> Result<ValidatedBlueprint, SchemaError> {
    validate_with(raw, &ValidationOptions::default())
}

/// Validate a raw document
///
/// # Errors
/// Returns the first hard [`SchemaError`] encountered.
pub fn validate_with(
    raw: &Value,
    options: &ValidationOptions,
) -> Result<ValidatedBlueprint, SchemaError> {
    let root = Node::root(raw);
    root.object()?;

    let width = root.field("width")?.positive_u32()?;
    let height = root.field("height")?.positive_u32()?;
    let background_color = root.field("background_color")?.string()?;
    let text_font_path = root.optional("text_font_path").map(|n| n.string()).transpose()?;
    let emoji_font_path = root
        .optional("emoji_font_path")
        .map(|n| n.string())
        .transpose()?;

    let elements_node = root.field("elements")?;
    let items = elements_node.array()?;

    let mut elements = Vec::with_capacity(items.len());
    let mut ids: HashMap<String, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        let node = elements_node.at(index, item);
        let element = element(&node)?;
        if let Some(id) = element.id() {
            if let Some(first) = ids.insert(id.to_string(), index) {
                return Err(SchemaError::new(
                    SchemaErrorKind::DuplicateId,
                    node.path.key("id"),
                    format!("id '{id}' already used by elements[{first}]"),
                ));
            }
        }
        elements.push(element);
    }

    let warnings = check_arrows(&elements, &elements_node.path, options)?;
    for warning in &warnings {
        tracing::warn!(%warning, "blueprint arrow inconsistency");
    }

    Ok(ValidatedBlueprint {
        blueprint: Blueprint {
            width,
            height,
            background_color,
            text_font_path,
            emoji_font_path,
            elements,
        },
        warnings,
    })
}

/// Resolve arrow references and collect endpoint warnings
fn check_arrows(
    elements: &[Element],
    elements_path: &SchemaPath,
    options: &ValidationOptions,
) -> Result<Vec<SchemaWarning>, SchemaError> {
    let mut warnings = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let Element::Arrow(arrow) = element else {
            continue;
        };
        let arrow_path = elements_path.index(index);

        let ends = [
            ("start_id", "start", &arrow.start_id, arrow.position.start),
            ("end_id", "end", &arrow.end_id, arrow.position.end),
        ];
        for (id_key, point_key, target_id, endpoint) in ends {
            let Some(target) = elements.iter().find(|e| e.id() == Some(target_id.as_str())) else {
                return Err(SchemaError::new(
                    SchemaErrorKind::UnresolvedReference,
                    arrow_path.key(id_key),
                    format!("no element with id '{target_id}'"),
                ));
            };

            if !target.bounds().contains_with_slack(endpoint, options.arrow_slack) {
                warnings.push(SchemaWarning::ArrowEndpointMismatch {
                    path: arrow_path.key("position").key(point_key),
                    target_id: target_id.clone(),
                    endpoint,
                });
            }
        }
    }

    Ok(warnings)
}

fn element(node: &Node<'_>) -> Result<Element, SchemaError> {
    node.object()?;
    let tag = node.field("type")?;
    match tag.str()? {
        "emoji" => emoji(node).map(Element::Emoji),
        "text" => text(node).map(Element::Text),
        "shape" => shape(node).map(Element::Shape),
        "arrow" => arrow(node).map(Element::Arrow),
        other => Err(SchemaError::new(
            SchemaErrorKind::TypeMismatch,
            tag.path,
            format!("unknown element type '{other}'"),
        )),
    }
}

fn emoji(node: &Node<'_>) -> Result<EmojiElement, SchemaError> {
    Ok(EmojiElement {
        id: node.field("id")?.string()?,
        emoji: node.field("emoji")?.string()?,
        position: position(&node.field("position")?)?,
        size: node.field("size")?.positive_u32()?,
        font_path: node.optional("font_path").map(|n| n.string()).transpose()?,
        rotation: node.optional("rotation").map(|n| n.i32()).transpose()?,
        caption: node.optional("caption").map(|n| caption(&n)).transpose()?,
    })
}

fn text(node: &Node<'_>) -> Result<TextElement, SchemaError> {
    Ok(TextElement {
        id: node.field("id")?.string()?,
        content: node.field("content")?.string()?,
        position: position(&node.field("position")?)?,
        font_size: node.field("font_size")?.positive_u32()?,
        color: node.field("color")?.string()?,
        font_path: node.optional("font_path").map(|n| n.string()).transpose()?,
        rotation: node.optional("rotation").map(|n| n.i32()).transpose()?,
    })
}

fn shape(node: &Node<'_>) -> Result<ShapeElement, SchemaError> {
    let kind_node = node.field("shape")?;
    let name = kind_node.str()?;
    let kind = ShapeKind::from_name(name).ok_or_else(|| {
        SchemaError::new(
            SchemaErrorKind::TypeMismatch,
            kind_node.path.clone(),
            format!("unknown shape '{name}'"),
        )
    })?;

    let id = node.field("id")?.string()?;
    let geometry = match kind {
        ShapeKind::Circle => {
            let size = node.field("size")?;
            size.object()?;
            ShapeGeometry::Circle {
                size: CircleSize {
                    rx: size.field("rx")?.positive_u32()?,
                    ry: size.field("ry")?.positive_u32()?,
                },
                position: position(&node.field("position")?)?,
            }
        }
        ShapeKind::Rectangle => {
            let size = node.field("size")?;
            size.object()?;
            ShapeGeometry::Rectangle {
                size: RectangleSize {
                    width: size.field("width")?.positive_u32()?,
                    height: size.field("height")?.positive_u32()?,
                },
                position: position(&node.field("position")?)?,
            }
        }
        ShapeKind::Line => {
            if let Some(size) = node.optional("size") {
                return Err(SchemaError::new(
                    SchemaErrorKind::TypeMismatch,
                    size.path,
                    "line shapes take no size",
                ));
            }
            ShapeGeometry::Line {
                position: line_position(&node.field("position")?)?,
            }
        }
    };

    Ok(ShapeElement {
        id,
        geometry,
        color: node.field("color")?.string()?,
        thickness: node.field("thickness")?.non_negative_u32()?,
        rotation: node.optional("rotation").map(|n| n.i32()).transpose()?,
        caption: node.optional("caption").map(|n| caption(&n)).transpose()?,
    })
}

fn arrow(node: &Node<'_>) -> Result<ArrowElement, SchemaError> {
    Ok(ArrowElement {
        start_id: node.field("start_id")?.string()?,
        end_id: node.field("end_id")?.string()?,
        color: node.field("color")?.string()?,
        position: line_position(&node.field("position")?)?,
        thickness: node.field("thickness")?.non_negative_u32()?,
    })
}

fn caption(node: &Node<'_>) -> Result<Caption, SchemaError> {
    node.object()?;
    Ok(Caption {
        content: node.field("content")?.string()?,
        position: position(&node.field("position")?)?,
        font_size: node.field("font_size")?.positive_u32()?,
        color: node.field("color")?.string()?,
    })
}

fn position(node: &Node<'_>) -> Result<Position, SchemaError> {
    node.object()?;
    Ok(Position {
        x: node.field("x")?.i32()?,
        y: node.field("y")?.i32()?,
    })
}

fn line_position(node: &Node<'_>) -> Result<LinePosition, SchemaError> {
    node.object()?;
    Ok(LinePosition {
        start: position(&node.field("start")?)?,
        end: position(&node.field("end")?)?,
    })
}

/// A value together with where it sits in the document
#[derive(Debug, Clone)]
struct Node<'a> {
    value: &'a Value,
    path: SchemaPath,
}

impl<'a> Node<'a> {
    fn root(value: &'a Value) -> Self {
        Self {
            value,
            path: SchemaPath::root(),
        }
    }

    fn at(&self, index: usize, value: &'a Value) -> Self {
        Self {
            value,
            path: self.path.index(index),
        }
    }

    fn object(&self) -> Result<&'a Map<String, Value>, SchemaError> {
        self.value
            .as_object()
            .ok_or_else(|| SchemaError::mismatch(self.path.clone(), "mapping", self.value))
    }

    fn array(&self) -> Result<&'a Vec<Value>, SchemaError> {
        self.value
            .as_array()
            .ok_or_else(|| SchemaError::mismatch(self.path.clone(), "sequence", self.value))
    }

    /// Required child; null counts as absent
    fn field(&self, key: &str) -> Result<Node<'a>, SchemaError> {
        self.optional(key)
            .ok_or_else(|| SchemaError::missing(self.path.key(key)))
    }

    /// Optional child; null counts as absent
    fn optional(&self, key: &str) -> Option<Node<'a>> {
        match self.value.as_object()?.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(Node {
                value,
                path: self.path.key(key),
            }),
        }
    }

    fn str(&self) -> Result<&'a str, SchemaError> {
        self.value
            .as_str()
            .ok_or_else(|| SchemaError::mismatch(self.path.clone(), "string", self.value))
    }

    fn string(&self) -> Result<String, SchemaError> {
        self.str().map(str::to_string)
    }

    /// Integer value; integral floats such as `12.0` are accepted
    fn integer(&self) -> Result<i64, SchemaError> {
        let Value::Number(number) = self.value else {
            return Err(SchemaError::mismatch(self.path.clone(), "integer", self.value));
        };
        if let Some(i) = number.as_i64() {
            return Ok(i);
        }
        if number.as_u64().is_some() {
            return Err(SchemaError::out_of_range(
                self.path.clone(),
                format!("{number} does not fit in 64 bits"),
            ));
        }
        match number.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() >= 9.0e15 => {
                Err(SchemaError::out_of_range(
                    self.path.clone(),
                    format!("{number} is too large"),
                ))
            }
            #[allow(clippy::cast_possible_truncation)]
            Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
            _ => Err(SchemaError::mismatch(self.path.clone(), "integer", self.value)),
        }
    }

    fn i32(&self) -> Result<i32, SchemaError> {
        let value = self.integer()?;
        i32::try_from(value).map_err(|_| {
            SchemaError::out_of_range(self.path.clone(), format!("{value} does not fit in 32 bits"))
        })
    }

    fn non_negative_u32(&self) -> Result<u32, SchemaError> {
        let value = self.integer()?;
        if value < 0 {
            return Err(SchemaError::out_of_range(
                self.path.clone(),
                format!("{value} must be >= 0"),
            ));
        }
        u32::try_from(value).map_err(|_| {
            SchemaError::out_of_range(self.path.clone(), format!("{value} does not fit in 32 bits"))
        })
    }

    fn positive_u32(&self) -> Result<u32, SchemaError> {
        let value = self.non_negative_u32()?;
        if value == 0 {
            return Err(SchemaError::out_of_range(self.path.clone(), "0 must be > 0"));
        }
        Ok(value)
    }
}
