//! Run configuration and error policies.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::common::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_FAILURES, DEFAULT_PROGRESS_INTERVAL_MS,
};

/// What to do when a vector cannot be set up (e.g. it names an unknown register).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetupPolicy {
    /// Stop the whole run with a fatal setup error.
    #[default]
    #[serde(rename = "abort")]
    AbortRun,
    /// Score the vector as one failed case and keep going.
    #[serde(rename = "fail")]
    FailCase,
}

/// What to do when the stepper reports a decode/execute fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Score the vector as one failed case and keep going.
    #[default]
    Fail,
    /// Stop the whole run with a fatal execution error.
    Abort,
}

impl FromStr for SetupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(SetupPolicy::AbortRun),
            "fail" => Ok(SetupPolicy::FailCase),
            other => Err(format!("unknown setup policy `{other}` (expected abort or fail)")),
        }
    }
}

impl FromStr for FaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(FaultPolicy::Fail),
            "abort" => Ok(FaultPolicy::Abort),
            other => Err(format!("unknown fault policy `{other}` (expected fail or abort)")),
        }
    }
}

impl fmt::Display for SetupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetupPolicy::AbortRun => "abort",
            SetupPolicy::FailCase => "fail",
        })
    }
}

impl fmt::Display for FaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultPolicy::Fail => "fail",
            FaultPolicy::Abort => "abort",
        })
    }
}

/// Parameters of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of worker threads (at least 1).
    pub concurrency: usize,
    /// First corpus index to run.
    pub start_index: usize,
    /// One past the last corpus index to run; `None` or anything past the corpus
    /// end means "to the end".
    pub end_index: Option<usize>,
    /// Failure count at which no further task is admitted (at least 1).
    pub max_failures: usize,
    /// Name of the program counter register, after mapping.
    pub program_counter: String,
    /// Handling of per-vector setup errors.
    pub setup_policy: SetupPolicy,
    /// Handling of stepper faults.
    pub fault_policy: FaultPolicy,
    /// Interval between progress reports.
    pub progress_interval: Duration,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the PC register.
    pub fn new(program_counter: impl Into<String>) -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            start_index: 0,
            end_index: None,
            max_failures: DEFAULT_MAX_FAILURES,
            program_counter: program_counter.into(),
            setup_policy: SetupPolicy::default(),
            fault_policy: FaultPolicy::default(),
            progress_interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
        }
    }

    /// Checks the invariants the coordinator relies on.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroConcurrency`, `ConfigError::ZeroMaxFailures`,
    /// `ConfigError::EmptyProgramCounter`, or `ConfigError::ZeroProgressInterval`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_failures == 0 {
            return Err(ConfigError::ZeroMaxFailures);
        }
        if self.program_counter.is_empty() {
            return Err(ConfigError::EmptyProgramCounter);
        }
        if self.progress_interval.is_zero() {
            return Err(ConfigError::ZeroProgressInterval);
        }
        Ok(())
    }

    /// Index range to run for a corpus of `corpus_len` cases.
    ///
    /// The end is clamped to the corpus length and the start to the end, so the
    /// range is always valid and possibly empty.
    pub fn range(&self, corpus_len: usize) -> Range<usize> {
        let end = self.end_index.map_or(corpus_len, |end| end.min(corpus_len));
        let start = self.start_index.min(end);
        start..end
    }
}
