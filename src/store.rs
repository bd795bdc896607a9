//! Annotation storage for reports.
//!
//! [`AnnotationStore`] is the source of truth for the left and right
//! annotation lists of one report. Every mutation goes through it, and it
//! decides which mutations are recorded in the [`SideHistory`]:
//!
//! | operation     | recorded in history |
//! |---------------|---------------------|
//! | `add`         | yes                 |
//! | `update`      | no                  |
//! | `delete`      | no                  |
//! | `reset_all`   | clears it           |
//!
//! Leaving `delete` out of history matches how the editor has always behaved.
//! It is a known open question whether that is intended, so it is kept (and
//! tested) as is rather than changed quietly.
//!
//! [`ReportStates`] keys one store per report so that several reports can be
//! open across navigation without sharing annotations.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::constants::{GENERATED_ID_PREFIX, UNDO_HISTORY_SIZE};
use crate::error::EditorError;
use crate::history::SideHistory;
use crate::model::{
    Annotation, AnnotationId, AnnotationPatch, Position, ReportId, Shape, Side, Style,
};

/// Decoded annotations used to initialise a report's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSeed {
    pub left: Vec<Annotation>,
    pub right: Vec<Annotation>,
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Annotation lists and history for both sides of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStore {
    report_id: ReportId,
    left: Vec<Annotation>,
    right: Vec<Annotation>,
    history: SideHistory,
    /// Counter for generating annotation ids. Only ever increases.
    next_id: u64,
}

impl AnnotationStore {
    /// Create an empty store.
    pub fn new(report_id: ReportId, max_history: usize) -> Self {
        Self {
            report_id,
            left: Vec::new(),
            right: Vec::new(),
            history: SideHistory::new(max_history),
            next_id: 1,
        }
    }

    /// Create a store from persisted annotations.
    ///
    /// Seeding is not an undoable mutation: history starts empty. Annotations
    /// without an id, or repeating an id already seen on the same side, are
    /// given a freshly generated id. Generated ids never take an id that a
    /// record of the same side was persisted with.
    pub fn from_seed(report_id: ReportId, seed: ReportSeed, max_history: usize) -> Self {
        let mut store = Self::new(report_id, max_history);
        for side in Side::all() {
            let incoming = match side {
                Side::Left => &seed.left,
                Side::Right => &seed.right,
            };
            let persisted: HashSet<AnnotationId> = incoming
                .iter()
                .filter(|a| !a.id.is_empty())
                .map(|a| a.id.clone())
                .collect();
            for annotation in incoming {
                let mut annotation = annotation.clone();
                if annotation.id.is_empty() || store.contains(side, &annotation.id) {
                    let fresh = store.generate_id(side, &persisted);
                    if !annotation.id.is_empty() {
                        log::warn!(
                            "Report {}: duplicate {} annotation id '{}' replaced with '{}'",
                            store.report_id,
                            side,
                            annotation.id,
                            fresh
                        );
                    }
                    annotation.id = fresh;
                }
                store.list_mut(side).push(annotation);
            }
        }
        log::info!(
            "Report {}: seeded {} left / {} right annotations",
            store.report_id,
            store.left.len(),
            store.right.len()
        );
        store
    }

    pub fn report_id(&self) -> &ReportId {
        &self.report_id
    }

    fn list_mut(&mut self, side: Side) -> &mut Vec<Annotation> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Current annotations of a side, in z-order (last drawn on top).
    pub fn annotations(&self, side: Side) -> &[Annotation] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Get an annotation by id.
    pub fn get(&self, side: Side, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations(side).iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, side: Side, id: &AnnotationId) -> bool {
        self.get(side, id).is_some()
    }

    /// Total number of annotations on both sides.
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Generate an id not present in the side's current list nor in `reserved`.
    fn generate_id(&mut self, side: Side, reserved: &HashSet<AnnotationId>) -> AnnotationId {
        loop {
            let candidate = AnnotationId::new(format!("{}-{}", GENERATED_ID_PREFIX, self.next_id));
            self.next_id += 1;
            if !reserved.contains(&candidate) && !self.contains(side, &candidate) {
                return candidate;
            }
        }
    }

    /// Append an annotation, recording the previous list for undo.
    ///
    /// If the annotation's id is empty or already used on this side, a fresh
    /// id is generated instead. Returns the id the annotation was stored under.
    pub fn add(&mut self, side: Side, mut annotation: Annotation) -> AnnotationId {
        let snapshot = self.annotations(side).to_vec();
        self.history.record_before_mutation(side, &snapshot);

        if annotation.id.is_empty() || self.contains(side, &annotation.id) {
            let fresh = self.generate_id(side, &HashSet::new());
            if !annotation.id.is_empty() {
                log::debug!(
                    "Annotation id '{}' already used on {}, stored as '{}'",
                    annotation.id,
                    side,
                    fresh
                );
            }
            annotation.id = fresh;
        }

        let id = annotation.id.clone();
        log::info!(
            "Report {}: added {} '{}' on {} (label {:?})",
            self.report_id,
            annotation.kind(),
            id,
            side,
            annotation.label
        );
        self.list_mut(side).push(annotation);
        id
    }

    /// Commit a freshly drawn shape under a generated id.
    pub fn commit(
        &mut self,
        side: Side,
        shape: Shape,
        label: String,
        style: Style,
    ) -> AnnotationId {
        let annotation = Annotation {
            id: AnnotationId::new(""),
            shape,
            label,
            style,
        };
        self.add(side, annotation)
    }

    /// Patch an annotation in place. Not recorded in history.
    ///
    /// Returns `Ok(false)` if no annotation has this id. A geometry patch for
    /// the wrong shape kind is an error and changes nothing.
    pub fn update(
        &mut self,
        side: Side,
        id: &AnnotationId,
        patch: &AnnotationPatch,
    ) -> Result<bool, EditorError> {
        let Some(annotation) = self.list_mut(side).iter_mut().find(|a| &a.id == id) else {
            log::debug!("Update on {}: no annotation '{}'", side, id);
            return Ok(false);
        };
        patch.apply(annotation)?;
        log::debug!("Updated annotation '{}' on {}", id, side);
        Ok(true)
    }

    /// Remove an annotation. Not recorded in history.
    ///
    /// Returns the removed annotation, or None if the id is unknown.
    pub fn delete(&mut self, side: Side, id: &AnnotationId) -> Option<Annotation> {
        let list = self.list_mut(side);
        let Some(index) = list.iter().position(|a| &a.id == id) else {
            log::debug!("Delete on {}: no annotation '{}'", side, id);
            return None;
        };
        let removed = list.remove(index);
        log::info!("Report {}: deleted '{}' on {}", self.report_id, id, side);
        Some(removed)
    }

    /// Restore the side's previous list. No-op on empty history.
    pub fn undo(&mut self, side: Side) -> bool {
        match side {
            Side::Left => self.history.undo(side, &mut self.left),
            Side::Right => self.history.undo(side, &mut self.right),
        }
    }

    /// Re-apply the last undone change. No-op on empty redo history.
    pub fn redo(&mut self, side: Side) -> bool {
        match side {
            Side::Left => self.history.redo(side, &mut self.left),
            Side::Right => self.history.redo(side, &mut self.right),
        }
    }

    /// Clear both sides and their history.
    ///
    /// This is a hard reset: it cannot be undone.
    pub fn reset_all(&mut self) {
        self.left.clear();
        self.right.clear();
        self.history.clear_all();
        log::info!("Report {}: all annotations reset", self.report_id);
    }

    pub fn can_undo(&self, side: Side) -> bool {
        self.history.can_undo(side)
    }

    pub fn can_redo(&self, side: Side) -> bool {
        self.history.can_redo(side)
    }

    /// Depth of the side's undo ("past") stack.
    pub fn undo_count(&self, side: Side) -> usize {
        self.history.undo_count(side)
    }

    /// Depth of the side's redo ("future") stack.
    pub fn redo_count(&self, side: Side) -> usize {
        self.history.redo_count(side)
    }

    /// Find the top-most annotation under a position.
    pub fn hit_test(&self, side: Side, position: Position) -> Option<&Annotation> {
        self.annotations(side)
            .iter()
            .rev()
            .find(|a| a.shape.contains(position))
    }
}

// ============================================================================
// Report States
// ============================================================================

/// Annotation stores keyed by report.
#[derive(Debug, Clone)]
pub struct ReportStates {
    reports: HashMap<ReportId, AnnotationStore>,
    max_history: usize,
}

impl Default for ReportStates {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_SIZE)
    }
}

impl ReportStates {
    pub fn new(max_history: usize) -> Self {
        Self {
            reports: HashMap::new(),
            max_history,
        }
    }

    /// Initialise a report's state from its persisted annotations.
    ///
    /// Any state already held for this report is replaced, never merged.
    /// Other reports are untouched.
    pub fn init_report_state(
        &mut self,
        report_id: ReportId,
        seed: ReportSeed,
    ) -> &mut AnnotationStore {
        let store = AnnotationStore::from_seed(report_id.clone(), seed, self.max_history);
        match self.reports.entry(report_id) {
            Entry::Occupied(mut entry) => {
                log::debug!("Replacing in-memory state for report {}", entry.key());
                entry.insert(store);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(store),
        }
    }

    pub fn get(&self, report_id: &ReportId) -> Option<&AnnotationStore> {
        self.reports.get(report_id)
    }

    pub fn get_mut(&mut self, report_id: &ReportId) -> Option<&mut AnnotationStore> {
        self.reports.get_mut(report_id)
    }

    /// Get a report's store or fail with [`EditorError::UnknownReport`].
    pub fn require_mut(
        &mut self,
        report_id: &ReportId,
    ) -> Result<&mut AnnotationStore, EditorError> {
        self.reports
            .get_mut(report_id)
            .ok_or_else(|| EditorError::UnknownReport(report_id.clone()))
    }

    pub fn contains(&self, report_id: &ReportId) -> bool {
        self.reports.contains_key(report_id)
    }

    /// Drop a report's in-memory state (the report view was closed).
    pub fn discard(&mut self, report_id: &ReportId) -> bool {
        let removed = self.reports.remove(report_id).is_some();
        if removed {
            log::debug!("Discarded in-memory state for report {}", report_id);
        }
        removed
    }

    /// Ids of all reports with in-memory state, in no particular order.
    pub fn report_ids(&self) -> impl Iterator<Item = &ReportId> {
        self.reports.keys()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
