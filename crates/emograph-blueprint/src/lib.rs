//! Emograph Blueprint
//!
//! Typed scene documents describing a 2D composition of emoji, text, shapes,
//! and arrows, plus the validation that turns untrusted generator output into
//! them.
//!
//! # Core Concepts
//!
//! - [`Blueprint`]: Validated scene with an ordered element list (render order)
//! - [`Element`]: Sum over emoji / text / shape / arrow
//! - [`validate`]: Raw document → [`ValidatedBlueprint`] or [`SchemaError`]
//! - [`OutputDocument`]: Generator reply text plus its blueprint
//!
//! # Example
//!
//! ```rust,ignore
//! use emograph_blueprint::{validate, Blueprint};
//!
//! let validated = validate(&raw)?;
//! for warning in &validated.warnings {
//!     eprintln!("{warning}");
//! }
//! let yaml = validated.blueprint.to_yaml()?;
//! assert_eq!(Blueprint::from_yaml(&yaml)?.blueprint, validated.blueprint);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod blueprint;
mod display;
mod element;
mod error;
mod geometry;
mod output;
mod path;
mod validate;

pub use blueprint::{Blueprint, ValidatedBlueprint};
pub use display::format_yaml_for_display;
pub use element::{
    ArrowElement, Caption, Element, EmojiElement, ShapeElement, ShapeGeometry, ShapeKind,
    TextElement,
};
pub use error::{SchemaError, SchemaErrorKind, SchemaWarning};
pub use geometry::{Bounds, CircleSize, LinePosition, Position, RectangleSize};
pub use output::{to_output_value, OutputDocument, BLUEPRINT_KEY, RESPONSE_KEY};
pub use path::{PathSegment, SchemaPath};
pub use validate::{validate, validate_with, ValidationOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
