//! Error types for editor operations.
//!
//! Most editing mistakes are not errors at all: unknown ids and empty history
//! are silent no-ops. What remains here is what a caller has to react to.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{AnnotationId, ReportId, ShapeKind};
use crate::persistence::PersistenceError;

/// Errors surfaced by the editor session and store.
#[derive(Error, Debug)]
pub enum EditorError {
    /// No annotation state has been initialised for this report
    #[error("No annotation state loaded for report '{0}'")]
    UnknownReport(ReportId),

    /// A command needs an open report but none is active
    #[error("No report is open for editing")]
    NoActiveReport,

    /// Geometry patch names fields of a different shape kind
    #[error("Cannot apply {found} geometry to {expected} annotation '{id}'")]
    ShapeMismatch {
        /// The annotation the patch targeted
        id: AnnotationId,
        /// Kind of the stored annotation
        expected: ShapeKind,
        /// Kind named by the patch
        found: ShapeKind,
    },

    /// Seed decoding or payload/draft I/O failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Configuration could not be loaded or saved
    #[error(transparent)]
    Config(#[from] ConfigError),
}
