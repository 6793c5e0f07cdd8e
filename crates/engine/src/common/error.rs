//! Error and fault definitions.
//!
//! This module defines how the harness classifies everything that can go wrong. It
//! provides:
//! 1. **Fatal Errors:** Configuration, load, and setup errors that stop a run before
//!    or during scheduling.
//! 2. **Stepper Faults:** Explicit decode/execute faults raised by a backend for a
//!    single step.
//! 3. **Run Errors:** `HarnessError`, the single error type returned to the caller,
//!    with process exit codes.
//!
//! Per-case state mismatches are not errors; they are scored by the comparator and
//! counted against the failure budget.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid or inconsistent run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The worker pool size was zero.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    /// The failure budget was zero, which would admit no test at all.
    #[error("max failures must be at least 1")]
    ZeroMaxFailures,

    /// The progress interval was zero.
    #[error("progress interval must be nonzero")]
    ZeroProgressInterval,

    /// The program counter register name was empty.
    #[error("program counter register name must not be empty")]
    EmptyProgramCounter,

    /// A register map file was given but produced no mappings.
    #[error("register map {} contains no valid mappings", .path.display())]
    EmptyRegisterMap {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// A configuration input could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A harness configuration file was not valid JSON for `HarnessConfig`.
    #[error("invalid configuration file {}: {source}", .path.display())]
    InvalidFile {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// The corpus or the architecture descriptor could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The corpus was not valid JSON.
    #[error("corpus is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The corpus was valid JSON but did not have the expected shape.
    #[error("corpus record {record}: {reason}")]
    MalformedRecord {
        /// Zero-based record position in the corpus.
        record: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The corpus top level was not an array of records.
    #[error("corpus must be a JSON array of test records")]
    NotAnArray,

    /// The descriptor was not well-formed XML.
    #[error("descriptor is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The descriptor root element was not the expected one.
    #[error("descriptor root element is <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        /// Name found in the file.
        found: String,
        /// Name the probe requires.
        expected: &'static str,
    },

    /// The descriptor format version did not match.
    #[error(
        "invalid descriptor version {found} (expected {expected}); \
         is the descriptor file correct?"
    )]
    VersionMismatch {
        /// Version found (0 when missing or unparsable).
        found: u32,
        /// Version the probe accepts.
        expected: u32,
    },

    /// The descriptor named no default address space.
    #[error("descriptor declares no default address space")]
    MissingDefaultSpace,

    /// The default address space was absent or had no nonzero width.
    #[error("default address space `{space}` has no declared nonzero size")]
    MissingSpaceWidth {
        /// Name of the default space.
        space: String,
    },
}

/// Per-task setup could not complete; the backend cannot run this vector.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// The vector names a register the backend does not know.
    #[error("unknown register `{name}`; do you need a register map?")]
    UnknownRegister {
        /// Register name after mapping.
        name: String,
    },

    /// The backend cannot model the architecture the descriptor declares.
    #[error("unsupported architecture: {reason}")]
    UnsupportedArchitecture {
        /// Why the backend refused.
        reason: String,
    },
}

/// A decode or execute fault raised while stepping one instruction.
///
/// Backends must report faults explicitly instead of leaving the state unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepFault {
    /// The fetched word is not a valid instruction encoding.
    IllegalInstruction {
        /// Address the instruction was fetched from.
        pc: u64,
        /// Raw encoding.
        raw: u32,
    },

    /// The encoding is valid but the backend does not implement it.
    Unsupported {
        /// Address the instruction was fetched from.
        pc: u64,
        /// Raw encoding.
        raw: u32,
    },

    /// An environment call was executed.
    EnvironmentCall {
        /// Address of the `ECALL`.
        pc: u64,
    },

    /// A breakpoint instruction was executed.
    Breakpoint {
        /// Address of the `EBREAK`.
        pc: u64,
    },

    /// A control transfer targeted a misaligned address.
    MisalignedTarget {
        /// Address of the jump or branch.
        pc: u64,
        /// Computed target.
        target: u64,
    },

    /// Backend-specific fault with a free-form reason.
    Backend(String),
}

impl fmt::Display for StepFault {
    /// Formats the fault for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepFault::IllegalInstruction { pc, raw } => {
                write!(f, "IllegalInstruction({raw:#010x}) at {pc:#x}")
            }
            StepFault::Unsupported { pc, raw } => {
                write!(f, "Unsupported({raw:#010x}) at {pc:#x}")
            }
            StepFault::EnvironmentCall { pc } => write!(f, "EnvironmentCall at {pc:#x}"),
            StepFault::Breakpoint { pc } => write!(f, "Breakpoint at {pc:#x}"),
            StepFault::MisalignedTarget { pc, target } => {
                write!(f, "MisalignedTarget({target:#x}) at {pc:#x}")
            }
            StepFault::Backend(reason) => write!(f, "Backend({reason})"),
        }
    }
}

impl std::error::Error for StepFault {}

/// Fatal error returned by a run. No partial statistics accompany it.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration was rejected before the run.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Corpus or descriptor failed to load before the run.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// A test vector could not be set up and the setup policy is fatal.
    #[error("test {index}: setup error: {source}")]
    Setup {
        /// Corpus index of the test.
        index: usize,
        /// What failed.
        #[source]
        source: SetupError,
    },

    /// The backend faulted and the fault policy is fatal.
    #[error("test {index}: execution error: {source}")]
    Execution {
        /// Corpus index of the test.
        index: usize,
        /// The fault raised by the backend.
        #[source]
        source: StepFault,
    },

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl HarnessError {
    /// Process exit code for this error.
    ///
    /// Threshold aborts are not errors and exit with 1 elsewhere; fatal errors use
    /// 2 (configuration), 3 (load), and 4 (setup, execution, or worker pool).
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Config(_) => 2,
            HarnessError::Load(_) => 3,
            HarnessError::Setup { .. }
            | HarnessError::Execution { .. }
            | HarnessError::WorkerPool(_) => 4,
        }
    }
}
