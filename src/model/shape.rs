//! Shape geometry for annotations.
//!
//! All coordinates are in image pixels of the fundus photo, origin at the
//! top-left corner. Rectangles keep the signed extents they were drawn with;
//! renderers and hit-testing go through [`Shape::normalized`] or
//! [`Shape::bounds`] when they need a canonical box.

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D position in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Calculate distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned extent of a shape, always with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a position lies inside or on the edge.
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

// ============================================================================
// Shape Types
// ============================================================================

/// Variant tag of a [`Shape`], matching the `type` field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Oval,
    Point,
}

impl ShapeKind {
    /// Wire tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Oval => "oval",
            ShapeKind::Point => "point",
        }
    }

    /// Parse a wire tag. Tags are matched exactly.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rectangle" => Some(ShapeKind::Rectangle),
            "oval" => Some(ShapeKind::Oval),
            "point" => Some(ShapeKind::Point),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Geometry of one annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Rectangle anchored at the corner where the drag started.
    ///
    /// `width`/`height` are signed: dragging up-left yields negative extents.
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Ellipse centered on `(x, y)`. Radii are never negative.
    Oval {
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
    },
    /// Fixed-size marker centered on `(x, y)`.
    Point { x: f64, y: f64, radius: f64 },
}

impl Shape {
    /// The provisional shape created on pointer-down, before any movement.
    pub fn start(kind: ShapeKind, anchor: Position, point_radius: f64) -> Self {
        match kind {
            ShapeKind::Rectangle => Shape::Rectangle {
                x: anchor.x,
                y: anchor.y,
                width: 0.0,
                height: 0.0,
            },
            ShapeKind::Oval => Shape::Oval {
                x: anchor.x,
                y: anchor.y,
                radius_x: 0.0,
                radius_y: 0.0,
            },
            ShapeKind::Point => Shape::Point {
                x: anchor.x,
                y: anchor.y,
                radius: point_radius,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Oval { .. } => ShapeKind::Oval,
            Shape::Point { .. } => ShapeKind::Point,
        }
    }

    /// The stored `(x, y)`: top-left anchor for rectangles, center otherwise.
    pub fn origin(&self) -> Position {
        match *self {
            Shape::Rectangle { x, y, .. }
            | Shape::Oval { x, y, .. }
            | Shape::Point { x, y, .. } => Position::new(x, y),
        }
    }

    /// Re-derive the extents from the drag anchor and the current pointer.
    ///
    /// Rectangles take the signed difference, ovals the absolute difference.
    /// Points have a fixed radius and are left unchanged.
    pub fn drag_to(&mut self, anchor: Position, current: Position) {
        match self {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                *x = anchor.x;
                *y = anchor.y;
                *width = current.x - anchor.x;
                *height = current.y - anchor.y;
            }
            Shape::Oval {
                x,
                y,
                radius_x,
                radius_y,
            } => {
                *x = anchor.x;
                *y = anchor.y;
                *radius_x = (current.x - anchor.x).abs();
                *radius_y = (current.y - anchor.y).abs();
            }
            Shape::Point { .. } => {}
        }
    }

    /// Canonical form: rectangles get a top-left origin and positive extents.
    pub fn normalized(&self) -> Shape {
        match *self {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => Shape::Rectangle {
                x: x.min(x + width),
                y: y.min(y + height),
                width: width.abs(),
                height: height.abs(),
            },
            other => other,
        }
    }

    /// Get the axis-aligned bounds of this shape.
    pub fn bounds(&self) -> Bounds {
        match self.normalized() {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => Bounds {
                min_x: x,
                min_y: y,
                max_x: x + width,
                max_y: y + height,
            },
            Shape::Oval {
                x,
                y,
                radius_x,
                radius_y,
            } => Bounds {
                min_x: x - radius_x,
                min_y: y - radius_y,
                max_x: x + radius_x,
                max_y: y + radius_y,
            },
            Shape::Point { x, y, radius } => Bounds {
                min_x: x - radius,
                min_y: y - radius,
                max_x: x + radius,
                max_y: y + radius,
            },
        }
    }

    /// Check if a position is inside/on this shape.
    pub fn contains(&self, p: Position) -> bool {
        match *self {
            Shape::Rectangle { .. } => self.bounds().contains(p),
            Shape::Oval {
                x,
                y,
                radius_x,
                radius_y,
            } => {
                // A flat oval collapses to a segment; fall back to its bounds.
                if radius_x == 0.0 || radius_y == 0.0 {
                    return self.bounds().contains(p);
                }
                let dx = (p.x - x) / radius_x;
                let dy = (p.y - y) / radius_y;
                dx * dx + dy * dy <= 1.0
            }
            Shape::Point { x, y, radius } => Position::new(x, y).distance_to(&p) <= radius,
        }
    }

    /// True when a rectangle or oval has no area (a click without a drag).
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Shape::Rectangle { width, height, .. } => width == 0.0 || height == 0.0,
            Shape::Oval {
                radius_x, radius_y, ..
            } => radius_x == 0.0 || radius_y == 0.0,
            Shape::Point { .. } => false,
        }
    }
}
