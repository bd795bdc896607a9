//! Unsaved-change bookkeeping for one report.
//!
//! The editor never talks to the server itself. The caller asks whether a
//! save is due, sends the payload, and reports back. A failed save leaves the
//! in-memory annotations as they are and keeps the report dirty.
//!
//! Every change bumps a revision number. A payload handed out for saving is
//! paired with a [`SaveToken`] naming the revision it contains, so a save
//! confirmed after further edits does not mark those edits as saved.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// The revision a save payload was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveToken(u64);

impl SaveToken {
    pub fn revision(&self) -> u64 {
        self.0
    }
}

/// Tracks whether a report has changes the server has not seen yet.
///
/// Saves are debounced: after a change, [`SaveTracker::should_save`] waits
/// for a quiet period so a burst of edits goes out as one request, and after
/// a failed save it waits before suggesting a retry.
#[derive(Debug)]
pub struct SaveTracker {
    /// Quiet period after the last change before a save is due.
    debounce_delay: Duration,

    /// Wait after a failed save before retrying.
    retry_delay: Duration,

    /// Time of last save attempt that completed successfully.
    last_save: Option<Instant>,

    /// Time of last failed save attempt.
    last_failure: Option<Instant>,

    /// Time of last change that needs saving.
    last_change: Option<Instant>,

    /// Reason given for the last failed save, cleared on success.
    last_error: Option<String>,

    /// Whether there are unsaved changes.
    dirty: bool,

    /// Number of changes seen so far. Only ever increases.
    revision: u64,
}

impl SaveTracker {
    /// Default quiet period (1 second).
    pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_secs(1);

    /// Default retry delay after a failure (10 seconds).
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self {
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            last_save: None,
            last_failure: None,
            last_change: None,
            last_error: None,
            dirty: false,
            revision: 0,
        }
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Mark that a change occurred that needs saving.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
        self.last_change = Some(Instant::now());
        log::trace!("Save tracker: marked dirty");
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if the caller should send the save payload now.
    ///
    /// True when there are unsaved changes, the debounce delay has passed
    /// since the last change, and no failed save happened within the retry
    /// delay.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }

        let Some(last_change) = self.last_change else {
            return false;
        };

        if last_change.elapsed() < self.debounce_delay {
            return false;
        }

        match self.last_failure {
            Some(failed) => failed.elapsed() >= self.retry_delay,
            None => true,
        }
    }

    /// Token for a payload taken from the current state.
    pub fn token(&self) -> SaveToken {
        SaveToken(self.revision)
    }

    /// Mark that the payload taken at `token` was saved.
    ///
    /// Returns true when that payload holds every change, so nothing is left
    /// unsaved. Changes made after the token was taken stay dirty.
    pub fn mark_saved(&mut self, token: SaveToken) -> bool {
        self.last_save = Some(Instant::now());
        self.last_failure = None;
        self.last_error = None;

        if token.0 < self.revision {
            log::debug!(
                "Save tracker: revision {} saved, {} still pending",
                token.0,
                self.revision
            );
            return false;
        }

        self.last_change = None;
        self.dirty = false;
        log::trace!("Save tracker: marked saved");
        true
    }

    /// Mark that a save failed. The report stays dirty.
    pub fn mark_save_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Save failed, keeping local changes: {}", reason);
        self.last_failure = Some(Instant::now());
        self.last_error = Some(reason);
    }

    /// Reason for the most recent failed save, if it has not succeeded since.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Get time since last successful save (if any).
    pub fn time_since_last_save(&self) -> Option<Duration> {
        self.last_save.map(|t| t.elapsed())
    }

    /// Get time since last change (if any).
    pub fn time_since_last_change(&self) -> Option<Duration> {
        self.last_change.map(|t| t.elapsed())
    }

    /// Forget all state, e.g. after the report was re-seeded from the server.
    ///
    /// The revision keeps counting so tokens taken before the reset cannot
    /// match later changes.
    pub fn reset(&mut self) {
        let revision = self.revision;
        *self = Self::new()
            .with_debounce_delay(self.debounce_delay)
            .with_retry_delay(self.retry_delay);
        self.revision = revision;
    }
}

impl Default for SaveTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let tracker = SaveTracker::new();
        assert!(!tracker.is_dirty());
        assert!(!tracker.should_save());
        assert!(tracker.time_since_last_save().is_none());
    }

    #[test]
    fn test_mark_saved_clears_dirty() {
        let mut tracker = SaveTracker::new();
        tracker.mark_dirty();
        assert!(tracker.is_dirty());

        assert!(tracker.mark_saved(tracker.token()));
        assert!(!tracker.is_dirty());
        assert!(tracker.time_since_last_save().is_some());
        assert!(tracker.time_since_last_change().is_none());
    }

    #[test]
    fn test_debounce() {
        let mut tracker = SaveTracker::new().with_debounce_delay(Duration::from_secs(3600));
        tracker.mark_dirty();
        assert!(!tracker.should_save());

        let mut immediate = SaveTracker::new().with_debounce_delay(Duration::ZERO);
        immediate.mark_dirty();
        assert!(immediate.should_save());
    }

    #[test]
    fn test_failure_keeps_dirty_and_delays_retry() {
        let mut tracker = SaveTracker::new()
            .with_debounce_delay(Duration::ZERO)
            .with_retry_delay(Duration::from_secs(3600));
        tracker.mark_dirty();
        tracker.mark_save_failed("503 Service Unavailable");

        assert!(tracker.is_dirty());
        assert_eq!(tracker.last_error(), Some("503 Service Unavailable"));
        assert!(!tracker.should_save());

        tracker.mark_saved(tracker.token());
        assert_eq!(tracker.last_error(), None);
    }

    #[test]
    fn test_changes_after_token_stay_dirty() {
        let mut tracker = SaveTracker::new();
        tracker.mark_dirty();
        let in_flight = tracker.token();
        tracker.mark_dirty();

        assert!(!tracker.mark_saved(in_flight));
        assert!(tracker.is_dirty());
        assert!(tracker.time_since_last_change().is_some());

        assert!(tracker.mark_saved(tracker.token()));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_reset_keeps_revision() {
        let mut tracker = SaveTracker::new();
        tracker.mark_dirty();
        let stale = tracker.token();
        tracker.reset();
        tracker.mark_dirty();

        assert!(stale < tracker.token());
        assert!(!tracker.mark_saved(stale));
    }

    #[test]
    fn test_reset_keeps_delays() {
        let mut tracker = SaveTracker::new().with_debounce_delay(Duration::ZERO);
        tracker.mark_dirty();
        tracker.reset();

        assert!(!tracker.is_dirty());
        tracker.mark_dirty();
        assert!(tracker.should_save());
    }
}
