//! Fundus annotation editor core.
//!
//! Editing state for paired fundus image annotations: shapes drawn on the
//! left and right eye images of a report, per-side undo/redo, and the
//! pointer/tool state machine that turns gestures into labeled annotations.
//!
//! The crate is UI- and transport-agnostic. A front end feeds it pointer
//! events and label dialog results through [`EditorSession`], renders
//! [`EditorSession::annotations`] and [`EditorSession::provisional`], and
//! sends the payload from [`EditorSession::begin_save`] to the report
//! backend, confirming it with [`EditorSession::mark_saved`].

pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod session;
pub mod store;

pub use config::{EditorConfig, EditorPreferences};
pub use error::EditorError;
pub use interaction::{CanvasBounds, Gesture, InteractionController};
pub use model::{Annotation, AnnotationId, AnnotationPatch, ReportId, Shape, Side, Style, Tool};
pub use session::{EditorMessage, EditorSession};
pub use store::{AnnotationStore, ReportSeed, ReportStates};
