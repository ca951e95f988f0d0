//! Time source abstraction.
//!
//! # Responsibility
//! - Provide record timestamps and debounce deadlines from one place.
//! - Allow deterministic time in tests via `ManualClock`.
//!
//! # Invariants
//! - Returned instants are truncated to millisecond precision, matching the
//!   stored timestamp format.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" for the store.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }
}

/// Manually advanced clock shared between clones.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::at_millis(start.timestamp_millis())
    }

    pub fn at_millis(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(epoch_ms)),
        }
    }

    /// Moves time forward for every clone of this clock.
    pub fn advance(&self, by: Duration) {
        self.epoch_ms
            .fetch_add(duration_to_millis(by), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.epoch_ms.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let epoch_ms = self.epoch_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(epoch_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

pub(crate) fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}

pub(crate) fn duration_to_millis(value: Duration) -> i64 {
    i64::try_from(value.as_millis()).unwrap_or(i64::MAX)
}
