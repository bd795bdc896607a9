//! Global constants for the annotation editor

/// Fixed radius of a point marker, in image pixels.
pub const DEFAULT_POINT_RADIUS: f64 = 5.0;

/// Stroke color given to newly drawn shapes.
pub const DEFAULT_STROKE: &str = "red";

/// Fill color given to newly drawn shapes.
pub const DEFAULT_FILL: &str = "transparent";

/// Stroke width given to newly drawn shapes.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Number of snapshots kept per side before the oldest is dropped.
pub const UNDO_HISTORY_SIZE: usize = 100;

/// Prefix for ids generated by the store.
pub const GENERATED_ID_PREFIX: &str = "annotation";
