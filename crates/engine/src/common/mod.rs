//! Common types shared across the harness.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Error Handling:** Fatal error kinds (configuration, load, setup) and stepper faults.
//! 2. **Constants:** Descriptor format version and harness-wide defaults.

/// Harness-wide constants.
pub mod constants;

/// Error types and fault definitions.
pub mod error;

pub use constants::SLEIGH_VERSION;
pub use error::{ConfigError, HarnessError, LoadError, SetupError, StepFault};
