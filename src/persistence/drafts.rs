//! Local draft cache.
//!
//! When enabled, the save payload of a report is written to disk after every
//! edit so work survives a crash or a lost connection. Drafts are plain
//! payload JSON, one file per report.

use std::path::{Path, PathBuf};

use super::error::PersistenceError;
use super::wire::ReportAnnotations;
use crate::model::ReportId;

/// Directory of per-report draft files.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftCache {
    root: PathBuf,
}

impl DraftCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<cache dir>/fundus-annotator/drafts`, if the platform has a cache dir.
    pub fn default_location() -> Option<Self> {
        dirs::cache_dir().map(|dir| Self::new(dir.join("fundus-annotator").join("drafts")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a report's draft file.
    pub fn path_for(&self, report_id: &ReportId) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(report_id.as_str())))
    }

    /// Write a report's draft, replacing any previous one.
    pub fn store(
        &self,
        report_id: &ReportId,
        payload: &ReportAnnotations,
    ) -> Result<PathBuf, PersistenceError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(report_id);
        std::fs::write(&path, payload.to_json()?)?;
        log::trace!("Draft for report {} written to {:?}", report_id, path);
        Ok(path)
    }

    /// Read a report's draft. Returns `Ok(None)` if there is none.
    pub fn load(
        &self,
        report_id: &ReportId,
    ) -> Result<Option<ReportAnnotations>, PersistenceError> {
        let path = self.path_for(report_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let payload = ReportAnnotations::from_json(&json)?;
        log::debug!(
            "Loaded draft for report {} ({} annotations)",
            report_id,
            payload.len()
        );
        Ok(Some(payload))
    }

    /// Delete a report's draft. Returns whether a file was removed.
    pub fn remove(&self, report_id: &ReportId) -> Result<bool, PersistenceError> {
        let path = self.path_for(report_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Turn a report id into a safe file stem.
///
/// ASCII letters, digits, `-` and `_` are kept. Every other byte becomes
/// `~XX` in hex, and the empty id becomes `~`, so distinct ids never share a
/// draft file.
fn file_stem(report_id: &str) -> String {
    if report_id.is_empty() {
        return "~".into();
    }

    let mut stem = String::with_capacity(report_id.len());
    for byte in report_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("~{:02X}", byte));
        }
    }
    stem
}
