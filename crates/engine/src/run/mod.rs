//! Run coordination.
//!
//! This module drives a corpus through a stepper. It provides:
//! 1. **Configuration:** Range, concurrency, failure budget, and error policies.
//! 2. **Statistics:** Atomic counters shared by all workers.
//! 3. **Tasks:** The per-case pipeline (setup, step, capture, compare).
//! 4. **Coordinator:** The bounded worker pool with threshold abort.

/// Run configuration and policies.
pub mod config;

/// Concurrent coordinator.
pub mod coordinator;

/// Atomic run statistics.
pub mod stats;

/// Per-case task pipeline.
pub mod task;

pub use config::{FaultPolicy, RunConfig, SetupPolicy};
pub use coordinator::{Coordinator, RunOutcome, RunStatus};
pub use stats::{RunStats, StatsSnapshot};
pub use task::{CaseResult, CaseVerdict, TaskOutcome};
