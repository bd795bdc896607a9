//! Undo/Redo history for annotation lists.
//!
//! Before every recorded mutation the affected side's whole annotation list is
//! copied into that side's [`SnapshotStack`]. Undo and redo swap whole lists.
//!
//! Left and right never share history.

use std::collections::VecDeque;

use crate::constants::UNDO_HISTORY_SIZE;
use crate::model::{Annotation, Side};

/// One side's full annotation list at some point in time.
pub type Snapshot = Vec<Annotation>;

// ============================================================================
// Snapshot Stack
// ============================================================================

/// Past and future annotation lists of one side.
///
/// `past` holds the lists undo can return to, oldest first. `future` holds
/// the lists undone since the last recorded change, newest undo last. At most
/// `depth` past snapshots are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStack {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    depth: usize,
}

impl Default for SnapshotStack {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_SIZE)
    }
}

impl SnapshotStack {
    /// A stack keeping up to `depth` past snapshots (at least one).
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the list as it was before a change. The future is dropped.
    pub fn record(&mut self, before: Snapshot) {
        self.future.clear();
        if self.past.len() == self.depth {
            self.past.pop_front();
        }
        self.past.push_back(before);
    }

    /// Trade `current` for the most recent past list.
    pub fn step_back(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Trade `current` for the most recently undone list.
    pub fn step_forward(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        Some(next)
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

// ============================================================================
// Per-side History
// ============================================================================

/// Snapshot history for both sides of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct SideHistory {
    left: SnapshotStack,
    right: SnapshotStack,
}

impl Default for SideHistory {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_SIZE)
    }
}

impl SideHistory {
    pub fn new(max_history: usize) -> Self {
        Self {
            left: SnapshotStack::new(max_history),
            right: SnapshotStack::new(max_history),
        }
    }

    fn stack(&self, side: Side) -> &SnapshotStack {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn stack_mut(&mut self, side: Side) -> &mut SnapshotStack {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Snapshot `current` as the state to return to, and drop the redo chain.
    pub fn record_before_mutation(&mut self, side: Side, current: &[Annotation]) {
        self.stack_mut(side).record(current.to_vec());
        log::debug!(
            "📝 History[{}]: recorded snapshot of {} annotations",
            side,
            current.len()
        );
    }

    /// Swap `current` for the previous snapshot. No-op when there is none.
    pub fn undo(&mut self, side: Side, current: &mut Vec<Annotation>) -> bool {
        let Some(prev) = self.stack_mut(side).step_back(current.clone()) else {
            log::debug!("History[{}]: nothing to undo", side);
            return false;
        };
        *current = prev;
        log::debug!("⏪ History[{}]: undo -> {} annotations", side, current.len());
        true
    }

    /// Swap `current` for the next redo snapshot. No-op when there is none.
    pub fn redo(&mut self, side: Side, current: &mut Vec<Annotation>) -> bool {
        let Some(next) = self.stack_mut(side).step_forward(current.clone()) else {
            log::debug!("History[{}]: nothing to redo", side);
            return false;
        };
        *current = next;
        log::debug!("⏩ History[{}]: redo -> {} annotations", side, current.len());
        true
    }

    pub fn can_undo(&self, side: Side) -> bool {
        self.stack(side).past_len() > 0
    }

    pub fn can_redo(&self, side: Side) -> bool {
        self.stack(side).future_len() > 0
    }

    /// Number of undo steps available on a side.
    pub fn undo_count(&self, side: Side) -> usize {
        self.stack(side).past_len()
    }

    /// Number of redo steps available on a side.
    pub fn redo_count(&self, side: Side) -> usize {
        self.stack(side).future_len()
    }

    /// Forget both sides' history.
    pub fn clear_all(&mut self) {
        self.left.clear();
        self.right.clear();
        log::debug!("🗑️ History cleared for both sides");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationId, Shape};

    fn point(id: &str, x: f64) -> Annotation {
        Annotation::new(
            AnnotationId::new(id),
            Shape::Point {
                x,
                y: x,
                radius: 5.0,
            },
        )
    }

    fn list(n: usize) -> Snapshot {
        (0..n).map(|i| point(&format!("p{}", i), i as f64)).collect()
    }

    #[test]
    fn test_step_back_and_forward() {
        let mut stack = SnapshotStack::new(10);
        assert_eq!(stack.step_back(list(0)), None);

        stack.record(list(0));
        assert_eq!(stack.step_back(list(1)), Some(list(0)));
        assert_eq!((stack.past_len(), stack.future_len()), (0, 1));

        assert_eq!(stack.step_forward(list(0)), Some(list(1)));
        assert_eq!((stack.past_len(), stack.future_len()), (1, 0));
    }

    #[test]
    fn test_record_drops_future() {
        let mut stack = SnapshotStack::new(10);
        stack.record(list(0));
        stack.step_back(list(1));

        stack.record(list(0));
        assert_eq!(stack.future_len(), 0);
        assert_eq!(stack.step_forward(list(2)), None);
    }

    #[test]
    fn test_depth_drops_oldest() {
        let mut stack = SnapshotStack::new(3);
        for n in 0..5 {
            stack.record(list(n));
        }

        assert_eq!(stack.past_len(), 3);
        assert_eq!(stack.step_back(list(5)), Some(list(4)));
        assert_eq!(stack.step_back(list(4)), Some(list(3)));
        assert_eq!(stack.step_back(list(3)), Some(list(2)));
        assert_eq!(stack.step_back(list(2)), None);
    }

    #[test]
    fn test_zero_depth_still_keeps_one() {
        let mut stack = SnapshotStack::new(0);
        stack.record(list(0));
        stack.record(list(1));
        assert_eq!(stack.past_len(), 1);
        assert_eq!(stack.step_back(list(2)), Some(list(1)));
    }

    #[test]
    fn test_side_history_round_trip() {
        let mut history = SideHistory::new(10);
        let mut current = vec![point("a", 1.0)];

        history.record_before_mutation(Side::Left, &current);
        current.push(point("b", 2.0));

        assert!(history.undo(Side::Left, &mut current));
        assert_eq!(current, vec![point("a", 1.0)]);
        assert_eq!(history.undo_count(Side::Left), 0);
        assert_eq!(history.redo_count(Side::Left), 1);

        assert!(history.redo(Side::Left, &mut current));
        assert_eq!(current, vec![point("a", 1.0), point("b", 2.0)]);
        assert_eq!(history.undo_count(Side::Left), 1);
        assert_eq!(history.redo_count(Side::Left), 0);
    }

    #[test]
    fn test_sides_are_independent() {
        let mut history = SideHistory::new(10);
        history.record_before_mutation(Side::Left, &[]);

        assert!(history.can_undo(Side::Left));
        assert!(!history.can_undo(Side::Right));

        let mut right: Vec<Annotation> = vec![point("r", 3.0)];
        assert!(!history.undo(Side::Right, &mut right));
        assert_eq!(right, vec![point("r", 3.0)]);
        assert_eq!(history.undo_count(Side::Left), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut history = SideHistory::new(10);
        history.record_before_mutation(Side::Left, &[]);
        history.record_before_mutation(Side::Right, &[]);
        history.clear_all();

        assert_eq!(history, SideHistory::new(10));
    }
}
