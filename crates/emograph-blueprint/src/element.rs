//! Blueprint elements
//!
//! [`Element`] is a closed sum over the four visual primitives. The `type`
//! discriminant (and `shape` for shapes) is written on serialization so the
//! YAML form reads the same as the documents the generator produces.

use crate::geometry::{Bounds, CircleSize, LinePosition, Position, RectangleSize};
use serde::Serialize;
use std::fmt;

/// Optional annotation attached to an emoji or shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub content: String,
    pub position: Position,
    pub font_size: u32,
    pub color: String,
}

/// Emoji glyph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiElement {
    pub id: String,
    pub emoji: String,
    pub position: Position,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

/// Free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextElement {
    pub id: String,
    pub content: String,
    pub position: Position,
    pub font_size: u32,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
}

/// Shape discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Line,
}

impl ShapeKind {
    /// Parse the `shape` discriminant
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "circle" => Some(Self::Circle),
            "rectangle" => Some(Self::Rectangle),
            "line" => Some(Self::Line),
            _ => None,
        }
    }

    /// Discriminant as written in documents
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-dependent shape payload
///
/// Circles and rectangles carry a size and a single anchor; lines carry two
/// endpoints and no size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeGeometry {
    /// Ellipse centered on `position`
    Circle { size: CircleSize, position: Position },
    /// Rectangle anchored at its top-left `position`
    Rectangle {
        size: RectangleSize,
        position: Position,
    },
    /// Straight segment
    Line { position: LinePosition },
}

impl ShapeGeometry {
    /// Shape discriminant
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Line { .. } => ShapeKind::Line,
        }
    }

    /// Bounding box of the payload
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match *self {
            Self::Circle { size, position } => Bounds::around(position, size.rx, size.ry),
            Self::Rectangle { size, position } => {
                Bounds::from_origin(position, size.width, size.height)
            }
            Self::Line { position } => Bounds::spanning(position.start, position.end),
        }
    }
}

/// Geometric shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeElement {
    pub id: String,
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    pub color: String,
    pub thickness: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

/// Arrow connecting two identified elements
///
/// Arrows have no id of their own. `position` is supplied independently of the
/// referenced elements and is only checked for consistency, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrowElement {
    pub start_id: String,
    pub end_id: String,
    pub color: String,
    pub position: LinePosition,
    pub thickness: u32,
}

/// One visual primitive of a blueprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Emoji(EmojiElement),
    Text(TextElement),
    Shape(ShapeElement),
    Arrow(ArrowElement),
}

impl Element {
    /// Element id, if this variant carries one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Emoji(e) => Some(&e.id),
            Self::Text(t) => Some(&t.id),
            Self::Shape(s) => Some(&s.id),
            Self::Arrow(_) => None,
        }
    }

    /// The `type` discriminant
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Emoji(_) => "emoji",
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
            Self::Arrow(_) => "arrow",
        }
    }

    /// Approximate on-canvas footprint
    ///
    /// Text width is estimated as one `font_size` per character.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Emoji(e) => Bounds::from_origin(e.position, e.size, e.size),
            Self::Text(t) => {
                let chars = u32::try_from(t.content.chars().count()).unwrap_or(u32::MAX);
                Bounds::from_origin(t.position, chars.saturating_mul(t.font_size), t.font_size)
            }
            Self::Shape(s) => s.geometry.bounds(),
            Self::Arrow(a) => Bounds::spanning(a.position.start, a.position.end),
        }
    }

    /// Caption attached to this element
    #[must_use]
    pub fn caption(&self) -> Option<&Caption> {
        match self {
            Self::Emoji(e) => e.caption.as_ref(),
            Self::Shape(s) => s.caption.as_ref(),
            Self::Text(_) | Self::Arrow(_) => None,
        }
    }
}
