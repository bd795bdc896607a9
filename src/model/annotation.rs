//! Annotation data model.

use serde::{Deserialize, Serialize};

use super::ids::AnnotationId;
use super::shape::{Shape, ShapeKind};
use crate::constants::{DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH};

/// Presentational attributes of an annotation.
///
/// Not interpreted by the editor, but carried through seed and save unchanged,
/// including their absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl Style {
    /// The style given to shapes drawn with the built-in defaults.
    pub fn drawing_default() -> Self {
        Self {
            stroke: Some(DEFAULT_STROKE.to_string()),
            fill: Some(DEFAULT_FILL.to_string()),
            stroke_width: Some(DEFAULT_STROKE_WIDTH),
        }
    }
}

/// One labeled marking on one fundus image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Unique within the side's list.
    pub id: AnnotationId,
    /// The shape geometry.
    pub shape: Shape,
    /// Free text; empty when labeling was cancelled.
    pub label: String,
    pub style: Style,
}

impl Annotation {
    /// Create an unlabeled annotation with no style.
    pub fn new(id: AnnotationId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            label: String::new(),
            style: Style::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}
