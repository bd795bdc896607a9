//! Typed partial updates for annotations.
//!
//! Geometry edits are split per variant so a patch can only name fields that
//! exist on the target shape. A patch for the wrong variant is rejected as a
//! whole instead of being half-applied.

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::shape::{Shape, ShapeKind};
use crate::error::EditorError;

/// Per-variant geometry changes. `None` fields are left as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeometryPatch {
    Rectangle {
        x: Option<f64>,
        y: Option<f64>,
        width: Option<f64>,
        height: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Oval {
        x: Option<f64>,
        y: Option<f64>,
        radius_x: Option<f64>,
        radius_y: Option<f64>,
    },
    Point {
        x: Option<f64>,
        y: Option<f64>,
        radius: Option<f64>,
    },
}

impl GeometryPatch {
    /// Move a shape of any kind to a new origin.
    pub fn move_to(kind: ShapeKind, x: f64, y: f64) -> Self {
        match kind {
            ShapeKind::Rectangle => GeometryPatch::Rectangle {
                x: Some(x),
                y: Some(y),
                width: None,
                height: None,
            },
            ShapeKind::Oval => GeometryPatch::Oval {
                x: Some(x),
                y: Some(y),
                radius_x: None,
                radius_y: None,
            },
            ShapeKind::Point => GeometryPatch::Point {
                x: Some(x),
                y: Some(y),
                radius: None,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            GeometryPatch::Rectangle { .. } => ShapeKind::Rectangle,
            GeometryPatch::Oval { .. } => ShapeKind::Oval,
            GeometryPatch::Point { .. } => ShapeKind::Point,
        }
    }

    /// Apply onto a shape of the same kind. Returns false on a kind mismatch.
    fn apply_to(&self, shape: &mut Shape) -> bool {
        fn set(target: &mut f64, value: Option<f64>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        match (self, shape) {
            (
                GeometryPatch::Rectangle {
                    x,
                    y,
                    width,
                    height,
                },
                Shape::Rectangle {
                    x: sx,
                    y: sy,
                    width: sw,
                    height: sh,
                },
            ) => {
                set(sx, *x);
                set(sy, *y);
                set(sw, *width);
                set(sh, *height);
                true
            }
            (
                GeometryPatch::Oval {
                    x,
                    y,
                    radius_x,
                    radius_y,
                },
                Shape::Oval {
                    x: sx,
                    y: sy,
                    radius_x: rx,
                    radius_y: ry,
                },
            ) => {
                set(sx, *x);
                set(sy, *y);
                // Radii stay non-negative
                set(rx, radius_x.map(f64::abs));
                set(ry, radius_y.map(f64::abs));
                true
            }
            (
                GeometryPatch::Point { x, y, radius },
                Shape::Point {
                    x: sx,
                    y: sy,
                    radius: sr,
                },
            ) => {
                set(sx, *x);
                set(sy, *y);
                set(sr, radius.map(f64::abs));
                true
            }
            _ => false,
        }
    }
}

/// A partial update to one annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationPatch {
    pub label: Option<String>,
    pub stroke: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: Option<f64>,
    pub geometry: Option<GeometryPatch>,
}

impl AnnotationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    pub fn fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn geometry(mut self, geometry: GeometryPatch) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.stroke.is_none()
            && self.fill.is_none()
            && self.stroke_width.is_none()
            && self.geometry.is_none()
    }

    /// Apply this patch in place.
    ///
    /// Fails without touching the annotation if the geometry patch targets a
    /// different shape kind.
    pub fn apply(&self, annotation: &mut Annotation) -> Result<(), EditorError> {
        if let Some(geometry) = &self.geometry {
            let mut shape = annotation.shape;
            if !geometry.apply_to(&mut shape) {
                return Err(EditorError::ShapeMismatch {
                    id: annotation.id.clone(),
                    expected: annotation.kind(),
                    found: geometry.kind(),
                });
            }
            annotation.shape = shape;
        }

        if let Some(label) = &self.label {
            annotation.label = label.clone();
        }
        if let Some(stroke) = &self.stroke {
            annotation.style.stroke = Some(stroke.clone());
        }
        if let Some(fill) = &self.fill {
            annotation.style.fill = Some(fill.clone());
        }
        if let Some(width) = self.stroke_width {
            annotation.style.stroke_width = Some(width);
        }
        Ok(())
    }
}
