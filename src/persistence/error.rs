//! Error types for reading and writing persisted annotations.

use thiserror::Error;

use crate::model::Side;

/// Errors that can occur while decoding seeds or writing payloads and drafts.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O error during draft file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record has no `type` field
    #[error("{side} annotation #{index} has no shape type")]
    MissingShapeType {
        /// Side list the record came from
        side: Side,
        /// Position of the record in its list
        index: usize,
    },

    /// Record's `type` is not one of rectangle, oval or point
    #[error("{side} annotation #{index} has unknown shape type '{found}'")]
    UnknownShapeType {
        /// Side list the record came from
        side: Side,
        /// Position of the record in its list
        index: usize,
        /// The type string that was encountered
        found: String,
    },

    /// Required field is missing
    #[error("{side} annotation #{index} is missing required field '{field}'")]
    MissingField {
        /// Side list the record came from
        side: Side,
        /// Position of the record in its list
        index: usize,
        /// Name of the missing field
        field: &'static str,
    },
}
