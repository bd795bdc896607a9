//! The editor session: what the report view talks to.
//!
//! An [`EditorSession`] owns the annotation state of every open report, the
//! interaction controller, and per-report save bookkeeping. All commands act
//! on the active report. Commands can be called directly or sent as
//! [`EditorMessage`]s through [`EditorSession::update`].

mod messages;

#[cfg(test)]
mod tests;

pub use messages::EditorMessage;

use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::interaction::{CanvasBounds, Gesture, InteractionController};
use crate::model::{
    Annotation, AnnotationId, AnnotationPatch, Position, ReportId, Shape, Side, Tool,
};
use crate::persistence::{DraftCache, FetchedReport, ReportAnnotations, SaveToken, SaveTracker};
use crate::store::{AnnotationStore, ReportStates};

/// Editing state for all open reports.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    reports: ReportStates,
    active: Option<ReportId>,
    controller: InteractionController,
    trackers: HashMap<ReportId, SaveTracker>,
    drafts: Option<DraftCache>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let drafts = if config.preferences.draft_cache {
            let location = DraftCache::default_location();
            if location.is_none() {
                log::warn!("Draft cache enabled but no cache directory is available");
            }
            location
        } else {
            None
        };

        Self {
            reports: ReportStates::new(config.preferences.max_history),
            active: None,
            controller: InteractionController::new(&config.preferences),
            trackers: HashMap::new(),
            drafts,
            config,
        }
    }

    /// Use `drafts` for local draft copies regardless of the config setting.
    pub fn with_draft_cache(mut self, drafts: DraftCache) -> Self {
        self.drafts = Some(drafts);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn draft_cache(&self) -> Option<&DraftCache> {
        self.drafts.as_ref()
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Load a report's persisted annotations and make it active.
    ///
    /// Replaces any in-memory state for the report and discards the current
    /// gesture, even when the report was already active. If a record cannot
    /// be decoded nothing is loaded and the previous state is kept.
    pub fn open_report(
        &mut self,
        report_id: ReportId,
        annotations: &ReportAnnotations,
    ) -> Result<(), EditorError> {
        let seed = annotations.decode(self.config.preferences.point_radius)?;
        self.controller.abort();
        self.reports.init_report_state(report_id.clone(), seed);
        self.trackers.entry(report_id.clone()).or_default().reset();
        self.activate(report_id);
        Ok(())
    }

    /// [`EditorSession::open_report`] for a fetched report document.
    pub fn open_fetched(&mut self, report: &FetchedReport) -> Result<(), EditorError> {
        self.open_report(report.id.clone(), &report.annotations)
    }

    /// Replace a report's state with its local draft, if one exists.
    ///
    /// The restored state counts as unsaved. Returns whether a draft was found.
    pub fn restore_draft(&mut self, report_id: ReportId) -> Result<bool, EditorError> {
        let Some(drafts) = &self.drafts else {
            return Ok(false);
        };
        let Some(payload) = drafts.load(&report_id)? else {
            return Ok(false);
        };
        self.open_report(report_id.clone(), &payload)?;
        self.tracker_mut(&report_id).mark_dirty();
        log::info!("Restored local draft for report {}", report_id);
        Ok(true)
    }

    /// Make an already loaded report the active one.
    pub fn switch_report(&mut self, report_id: ReportId) -> Result<(), EditorError> {
        if !self.reports.contains(&report_id) {
            return Err(EditorError::UnknownReport(report_id));
        }
        self.activate(report_id);
        Ok(())
    }

    fn activate(&mut self, report_id: ReportId) {
        if self.active.as_ref() != Some(&report_id) {
            self.controller.abort();
            log::debug!("Active report: {}", report_id);
        }
        self.active = Some(report_id);
    }

    /// Drop a report's in-memory state. Unsaved changes are not synced.
    pub fn close_report(&mut self, report_id: &ReportId) -> bool {
        if self.active.as_ref() == Some(report_id) {
            self.controller.abort();
            self.active = None;
        }
        if self
            .trackers
            .remove(report_id)
            .is_some_and(|tracker| tracker.is_dirty())
        {
            log::warn!("Closing report {} with unsaved changes", report_id);
        }
        self.reports.discard(report_id)
    }

    pub fn active_report(&self) -> Option<&ReportId> {
        self.active.as_ref()
    }

    pub fn reports(&self) -> &ReportStates {
        &self.reports
    }

    fn active_id(&self) -> Result<ReportId, EditorError> {
        self.active.clone().ok_or(EditorError::NoActiveReport)
    }

    /// The active report's store.
    pub fn store(&self) -> Result<&AnnotationStore, EditorError> {
        let report_id = self.active.as_ref().ok_or(EditorError::NoActiveReport)?;
        self.reports
            .get(report_id)
            .ok_or_else(|| EditorError::UnknownReport(report_id.clone()))
    }

    /// Annotations of the active report. Empty when no report is open.
    pub fn annotations(&self, side: Side) -> &[Annotation] {
        match self.store() {
            Ok(store) => store.annotations(side),
            Err(_) => &[],
        }
    }

    pub fn can_undo(&self, side: Side) -> bool {
        self.store().is_ok_and(|store| store.can_undo(side))
    }

    pub fn can_redo(&self, side: Side) -> bool {
        self.store().is_ok_and(|store| store.can_redo(side))
    }

    // ------------------------------------------------------------------
    // Tools and pointer input
    // ------------------------------------------------------------------

    pub fn current_tool(&self) -> Option<Tool> {
        self.controller.current_tool()
    }

    pub fn set_tool(&mut self, tool: Option<Tool>) {
        self.controller.set_tool(tool);
    }

    pub fn set_canvas_bounds(&mut self, side: Side, bounds: Option<CanvasBounds>) {
        self.controller.set_canvas_bounds(side, bounds);
    }

    pub fn gesture(&self) -> &Gesture {
        self.controller.gesture()
    }

    /// The shape currently being drawn or waiting for a label.
    pub fn provisional(&self) -> Option<(Side, &Shape)> {
        self.controller.gesture().provisional()
    }

    pub fn pending_label(&self) -> Option<(Side, &Shape)> {
        self.controller.pending_label()
    }

    /// Pointer pressed. Ignored while no report is open.
    pub fn pointer_down(&mut self, side: Side, position: Position) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.controller.pointer_down(side, position)
    }

    pub fn pointer_move(&mut self, side: Side, position: Position) -> bool {
        self.controller.pointer_move(side, position)
    }

    pub fn pointer_up(&mut self, side: Side, position: Position) -> bool {
        self.controller.pointer_up(side, position)
    }

    /// Commit the pending shape with `label`.
    ///
    /// Returns `Ok(None)` when no shape is waiting for a label.
    pub fn submit_label(
        &mut self,
        label: impl Into<String>,
    ) -> Result<Option<AnnotationId>, EditorError> {
        let report_id = self.active_id()?;
        let store = self.reports.require_mut(&report_id)?;
        let committed = self.controller.submit_label(store, label);
        if committed.is_some() {
            self.after_change(&report_id);
        }
        Ok(committed)
    }

    /// Dismiss the label dialog. The pending shape is still committed, unlabeled.
    pub fn cancel_label(&mut self) -> Result<Option<AnnotationId>, EditorError> {
        let report_id = self.active_id()?;
        let store = self.reports.require_mut(&report_id)?;
        let committed = self.controller.cancel_label(store);
        if committed.is_some() {
            self.after_change(&report_id);
        }
        Ok(committed)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn undo(&mut self, side: Side) -> Result<bool, EditorError> {
        let report_id = self.active_id()?;
        let changed = self.reports.require_mut(&report_id)?.undo(side);
        if changed {
            self.after_change(&report_id);
        }
        Ok(changed)
    }

    pub fn redo(&mut self, side: Side) -> Result<bool, EditorError> {
        let report_id = self.active_id()?;
        let changed = self.reports.require_mut(&report_id)?.redo(side);
        if changed {
            self.after_change(&report_id);
        }
        Ok(changed)
    }

    /// Clear both sides and their history. Any shape in progress is discarded.
    pub fn reset_all(&mut self) -> Result<(), EditorError> {
        let report_id = self.active_id()?;
        self.reports.require_mut(&report_id)?.reset_all();
        self.controller.abort();
        self.after_change(&report_id);
        Ok(())
    }

    pub fn update_annotation(
        &mut self,
        side: Side,
        id: &AnnotationId,
        patch: &AnnotationPatch,
    ) -> Result<bool, EditorError> {
        let report_id = self.active_id()?;
        let updated = self.reports.require_mut(&report_id)?.update(side, id, patch)?;
        if updated {
            self.after_change(&report_id);
        }
        Ok(updated)
    }

    pub fn delete_annotation(
        &mut self,
        side: Side,
        id: &AnnotationId,
    ) -> Result<Option<Annotation>, EditorError> {
        let report_id = self.active_id()?;
        let removed = self.reports.require_mut(&report_id)?.delete(side, id);
        if removed.is_some() {
            self.after_change(&report_id);
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// The `{left, right}` payload to send to the report update endpoint.
    pub fn save_payload(&self) -> Result<ReportAnnotations, EditorError> {
        Ok(ReportAnnotations::from_store(self.store()?))
    }

    /// The save payload together with the token to confirm it with.
    ///
    /// Pass the token to [`EditorSession::mark_saved`] once the server has
    /// accepted the payload.
    pub fn begin_save(&mut self) -> Result<(ReportAnnotations, SaveToken), EditorError> {
        let report_id = self.active_id()?;
        let payload = self.save_payload()?;
        Ok((payload, self.tracker_mut(&report_id).token()))
    }

    pub fn tracker(&self, report_id: &ReportId) -> Option<&SaveTracker> {
        self.trackers.get(report_id)
    }

    fn tracker_mut(&mut self, report_id: &ReportId) -> &mut SaveTracker {
        self.trackers.entry(report_id.clone()).or_default()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|id| self.trackers.get(id))
            .is_some_and(SaveTracker::is_dirty)
    }

    /// Whether the caller should send the active report's payload now.
    pub fn should_save(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|id| self.trackers.get(id))
            .is_some_and(SaveTracker::should_save)
    }

    /// The server accepted the active report's payload taken at `token`.
    ///
    /// Returns whether the report is now fully saved. Edits made after the
    /// payload was taken keep the report dirty and keep its draft.
    pub fn mark_saved(&mut self, token: SaveToken) -> Result<bool, EditorError> {
        let report_id = self.active_id()?;
        if !self.tracker_mut(&report_id).mark_saved(token) {
            return Ok(false);
        }
        if let Some(drafts) = &self.drafts {
            if let Err(e) = drafts.remove(&report_id) {
                log::warn!("Failed to remove draft for report {}: {}", report_id, e);
            }
        }
        Ok(true)
    }

    /// The save request failed. Local annotations are kept as they are.
    pub fn mark_save_failed(&mut self, reason: impl Into<String>) -> Result<(), EditorError> {
        let report_id = self.active_id()?;
        self.tracker_mut(&report_id).mark_save_failed(reason);
        Ok(())
    }

    fn after_change(&mut self, report_id: &ReportId) {
        self.tracker_mut(report_id).mark_dirty();

        let (Some(drafts), Some(store)) = (&self.drafts, self.reports.get(report_id)) else {
            return;
        };
        let payload = ReportAnnotations::from_store(store);
        if let Err(e) = drafts.store(report_id, &payload) {
            log::warn!("Failed to write draft for report {}: {}", report_id, e);
        }
    }

    // ------------------------------------------------------------------
    // Message dispatch
    // ------------------------------------------------------------------

    /// Apply one message.
    pub fn update(&mut self, message: EditorMessage) -> Result<(), EditorError> {
        log::trace!("Message: {:?}", message);
        match message {
            EditorMessage::SwitchReport { report_id } => self.switch_report(report_id)?,
            EditorMessage::CloseReport { report_id } => {
                self.close_report(&report_id);
            }
            EditorMessage::SetTool { tool } => self.set_tool(tool),
            EditorMessage::SetCanvasBounds {
                side,
                width,
                height,
            } => self.set_canvas_bounds(side, Some(CanvasBounds::new(width, height))),
            EditorMessage::ClearCanvasBounds { side } => self.set_canvas_bounds(side, None),
            EditorMessage::PointerDown { side, x, y } => {
                self.pointer_down(side, Position::new(x, y));
            }
            EditorMessage::PointerMove { side, x, y } => {
                self.pointer_move(side, Position::new(x, y));
            }
            EditorMessage::PointerUp { side, x, y } => {
                self.pointer_up(side, Position::new(x, y));
            }
            EditorMessage::SubmitLabel { label } => {
                self.submit_label(label)?;
            }
            EditorMessage::CancelLabel => {
                self.cancel_label()?;
            }
            EditorMessage::Undo { side } => {
                self.undo(side)?;
            }
            EditorMessage::Redo { side } => {
                self.redo(side)?;
            }
            EditorMessage::ResetAll => self.reset_all()?,
            EditorMessage::UpdateAnnotation { side, id, patch } => {
                self.update_annotation(side, &id, &patch)?;
            }
            EditorMessage::DeleteAnnotation { side, id } => {
                self.delete_annotation(side, &id)?;
            }
            EditorMessage::MarkSaved { token } => {
                self.mark_saved(token)?;
            }
            EditorMessage::MarkSaveFailed { reason } => self.mark_save_failed(reason)?,
        }
        Ok(())
    }
}
