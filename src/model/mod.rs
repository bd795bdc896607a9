//! Data models for the annotation editor.

mod annotation;
mod ids;
mod patch;
mod shape;
mod side;
mod tool;

pub use annotation::{Annotation, Style};
pub use ids::{AnnotationId, ReportId};
pub use patch::{AnnotationPatch, GeometryPatch};
pub use shape::{Bounds, Position, Shape, ShapeKind};
pub use side::Side;
pub use tool::Tool;
