//! Pixel geometry shared by blueprint elements

use serde::{Deserialize, Serialize};

/// Pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Position {
    /// Create new position
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Start and end of a line or arrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePosition {
    /// Start point
    pub start: Position,
    /// End point
    pub end: Position,
}

impl LinePosition {
    /// Create new line position
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Radii of a circle or ellipse, both > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircleSize {
    /// Horizontal radius
    pub rx: u32,
    /// Vertical radius
    pub ry: u32,
}

/// Rectangle extent, both > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectangleSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Axis-aligned bounding box, inclusive on both ends
///
/// Coordinates are widened to `i64` so that position + extent never overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Bounds {
    /// Box with top-left `origin` and the given extent
    #[must_use]
    pub fn from_origin(origin: Position, width: u32, height: u32) -> Self {
        let x = i64::from(origin.x);
        let y = i64::from(origin.y);
        Self {
            min_x: x,
            min_y: y,
            max_x: x + i64::from(width),
            max_y: y + i64::from(height),
        }
    }

    /// Box centered on `center` with half-extents `rx`, `ry`
    #[must_use]
    pub fn around(center: Position, rx: u32, ry: u32) -> Self {
        let x = i64::from(center.x);
        let y = i64::from(center.y);
        Self {
            min_x: x - i64::from(rx),
            min_y: y - i64::from(ry),
            max_x: x + i64::from(rx),
            max_y: y + i64::from(ry),
        }
    }

    /// Smallest box containing both points
    #[must_use]
    pub fn spanning(a: Position, b: Position) -> Self {
        Self {
            min_x: i64::from(a.x.min(b.x)),
            min_y: i64::from(a.y.min(b.y)),
            max_x: i64::from(a.x.max(b.x)),
            max_y: i64::from(a.y.max(b.y)),
        }
    }

    /// Check if `point` lies inside the box grown by `slack` on every side
    #[must_use]
    pub fn contains_with_slack(&self, point: Position, slack: u32) -> bool {
        let slack = i64::from(slack);
        let x = i64::from(point.x);
        let y = i64::from(point.y);
        x >= self.min_x - slack
            && x <= self.max_x + slack
            && y >= self.min_y - slack
            && y <= self.max_y + slack
    }
}
