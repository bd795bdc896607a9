//! Drawing tools.

use serde::{Deserialize, Serialize};

use super::shape::ShapeKind;

/// Drawing tools available in the editor.
///
/// "No tool" is modelled as `Option<Tool>::None`: nothing can be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Drag out a rectangle from a corner
    Rectangle,
    /// Drag out an oval from its center
    Oval,
    /// Click to place a fixed-radius marker
    Point,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Rectangle => "Rectangle",
            Tool::Oval => "Oval",
            Tool::Point => "Point",
        }
    }

    /// Get all available drawing tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Rectangle, Tool::Oval, Tool::Point]
    }

    /// The kind of shape this tool produces.
    pub fn shape_kind(&self) -> ShapeKind {
        match self {
            Tool::Rectangle => ShapeKind::Rectangle,
            Tool::Oval => ShapeKind::Oval,
            Tool::Point => ShapeKind::Point,
        }
    }

    /// Whether a single pointer-down completes the shape.
    pub fn completes_on_press(&self) -> bool {
        matches!(self, Tool::Point)
    }
}
