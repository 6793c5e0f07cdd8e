//! Single-instruction conformance harness library.
//!
//! This crate replays recorded instruction-level test vectors against an
//! instruction decode/execute backend and reports which vectors disagree. It provides:
//! 1. **Inputs:** Corpus loader, register name mapper, and architecture descriptor probe.
//! 2. **Stepper:** The backend interface plus a built-in RV32I/RV64IM implementation.
//! 3. **Run:** The concurrent coordinator, run configuration, and atomic statistics.
//! 4. **Scoring:** State comparison and console/JSON reporting.

/// Architecture descriptor arena and metadata probe.
pub mod arch;
/// Shared error types and constants.
pub mod common;
/// Expected-versus-actual state comparison.
pub mod compare;
/// Harness configuration file (JSON) and its defaults.
pub mod config;
/// Test corpus loading and register name mapping.
pub mod corpus;
/// Console and JSON reporting of run results.
pub mod report;
/// Run configuration, statistics, and the concurrent coordinator.
pub mod run;
/// Architectural state and test case data model.
pub mod state;
/// Instruction stepper interface and the built-in RISC-V backend.
pub mod stepper;

/// Immutable, parsed-once architecture descriptor.
pub use crate::arch::ArchitectureDescriptor;
/// Fatal error wrapper returned by a run.
pub use crate::common::HarnessError;
/// Harness configuration file.
pub use crate::config::HarnessConfig;
/// Register name translation table.
pub use crate::corpus::RegisterMapping;
/// Reporting.
pub use crate::report::{ConsoleReporter, Reporter, RunReport};
/// Coordinator entry point and its outcome.
pub use crate::run::{Coordinator, RunConfig, RunOutcome, RunStatus};
/// Data model.
pub use crate::state::{MachineState, TestCase};
