//! Debounced write-back scheduling.
//!
//! # Responsibility
//! - Track which record ids changed since the last successful write-back.
//! - Own the single debounce deadline; every mark re-arms it.
//!
//! # Invariants
//! - Marks inside the quiet period coalesce into one pending pass.
//! - The dirty set is cleared only by a successful pass (`complete`).
//! - The scheduler holds ids only; record state is re-read at flush time.

use crate::clock::duration_to_millis;
use crate::model::book::BookId;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;

/// Dirty set plus debounce deadline.
#[derive(Debug, Clone)]
pub struct PersistScheduler {
    debounce_ms: i64,
    deadline_ms: Option<i64>,
    dirty: BTreeSet<BookId>,
}

impl PersistScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce_ms: duration_to_millis(debounce),
            deadline_ms: None,
            dirty: BTreeSet::new(),
        }
    }

    /// Adds `id` to the dirty set and restarts the quiet period.
    pub fn mark_dirty(&mut self, id: &str, now: DateTime<Utc>) {
        self.dirty.insert(id.to_string());
        self.arm(now);
    }

    /// Restarts the quiet period without marking a record.
    ///
    /// Used when only the id list needs rewriting.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.deadline_ms = Some(now.timestamp_millis().saturating_add(self.debounce_ms));
    }

    /// Returns whether an armed deadline has elapsed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.deadline_ms
            .is_some_and(|deadline| now.timestamp_millis() >= deadline)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline_ms.and_then(DateTime::from_timestamp_millis)
    }

    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    pub fn pending(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_idle(&self) -> bool {
        self.deadline_ms.is_none() && self.dirty.is_empty()
    }

    /// Drops an id whose record no longer exists.
    pub(crate) fn forget(&mut self, id: &str) {
        self.dirty.remove(id);
    }

    /// Successful pass: clear everything.
    pub(crate) fn complete(&mut self) {
        self.dirty.clear();
        self.deadline_ms = None;
    }

    /// Failed pass: keep the dirty set for the next cycle, stop the timer.
    pub(crate) fn disarm(&mut self) {
        self.deadline_ms = None;
    }
}
