//! Atomic run statistics.
//!
//! Counters are only ever incremented, so plain atomic adds are enough; no counter
//! update needs to be ordered against another. A `StatsSnapshot` is a plain copy for
//! reporting.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Live counters for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    submitted: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    faulted: AtomicUsize,
}

impl RunStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a task was admitted.
    pub fn record_submitted(&self) {
        let _ = self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that a task finished, whatever its verdict.
    pub fn record_completed(&self) {
        let _ = self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed case and returns the new failure count.
    pub fn record_failed(&self) -> usize {
        self.failed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records that a failure was caused by a stepper fault.
    pub fn record_faulted(&self) {
        let _ = self.faulted.fetch_add(1, Ordering::Relaxed);
    }

    /// Current failure count.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Acquire)
    }

    /// Copies the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Acquire),
            faulted: self.faulted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Tasks admitted to a worker.
    pub submitted: usize,
    /// Tasks that finished.
    pub completed: usize,
    /// Tasks scored as failures (mismatches, and faults under the failing policy).
    pub failed: usize,
    /// Failures caused by a stepper fault.
    pub faulted: usize,
}

impl StatsSnapshot {
    /// Tasks that finished and passed.
    pub fn passed(&self) -> usize {
        self.completed.saturating_sub(self.failed)
    }
}
