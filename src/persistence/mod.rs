//! Persisted forms of report annotations.
//!
//! - [`wire`]: the report fetch / save payload records and seed decoding
//! - [`SaveTracker`]: unsaved-change bookkeeping for the caller's save loop
//! - [`DraftCache`]: optional local copies of unsaved work

mod drafts;
mod error;
mod save_tracker;
pub mod wire;

pub use drafts::DraftCache;
pub use error::PersistenceError;
pub use save_tracker::{SaveToken, SaveTracker};
pub use wire::{AnnotationRecord, FetchedReport, ReportAnnotations};
