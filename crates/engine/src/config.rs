//! Harness configuration file.
//!
//! Every run parameter can be supplied in a JSON file and overridden on the command line.
//! It provides:
//! 1. **Defaults:** The values used when neither the file nor a flag sets a field.
//! 2. **Structure:** `HarnessConfig`, a flat, fully defaulted document.
//! 3. **Conversion:** Into the validated `RunConfig` and the corpus `CorpusFormat`.
//!
//! An empty object `{}` is a valid file; only the program counter has no default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::ConfigError;
use crate::common::constants;
use crate::corpus::CorpusFormat;
use crate::run::{FaultPolicy, RunConfig, SetupPolicy};

/// Default values for fields missing from the file.
mod defaults {
    use super::constants;

    /// One worker thread.
    pub const THREADS: usize = constants::DEFAULT_CONCURRENCY;

    /// Failure budget before the run stops admitting cases.
    pub const MAX_FAILURES: usize = constants::DEFAULT_MAX_FAILURES;

    /// Progress report interval in milliseconds.
    pub const PROGRESS_INTERVAL_MS: u64 = constants::DEFAULT_PROGRESS_INTERVAL_MS;
}

/// Harness configuration as read from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Program counter register name, after mapping.
    pub program_counter: Option<String>,

    /// Register mapping file.
    pub register_map: Option<PathBuf>,

    /// Number of worker threads.
    pub threads: usize,

    /// Failure budget.
    pub max_failures: usize,

    /// First corpus index to run.
    pub start_test: usize,

    /// One past the last corpus index to run; absent means the corpus end.
    pub end_test: Option<usize>,

    /// Key of the memory list inside each state object of the corpus.
    pub memory_key: String,

    /// Handling of per-vector setup errors.
    pub setup_policy: SetupPolicy,

    /// Handling of stepper faults.
    pub fault_policy: FaultPolicy,

    /// Interval between progress reports, in milliseconds.
    pub progress_interval_ms: u64,

    /// Suppress per-case SUCCESS lines.
    pub quiet: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            program_counter: None,
            register_map: None,
            threads: defaults::THREADS,
            max_failures: defaults::MAX_FAILURES,
            start_test: 0,
            end_test: None,
            memory_key: constants::DEFAULT_MEMORY_KEY.to_string(),
            setup_policy: SetupPolicy::default(),
            fault_policy: FaultPolicy::default(),
            progress_interval_ms: defaults::PROGRESS_INTERVAL_MS,
            quiet: false,
        }
    }
}

impl HarnessConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Any JSON syntax error, type mismatch, or unknown field.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, `ConfigError::InvalidFile` if it
    /// does not parse.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds and validates the run configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError::EmptyProgramCounter` when no program counter was given, plus
    /// anything `RunConfig::validate` rejects.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let program_counter = self
            .program_counter
            .clone()
            .ok_or(ConfigError::EmptyProgramCounter)?;

        let config = RunConfig {
            concurrency: self.threads,
            start_index: self.start_test,
            end_index: self.end_test,
            max_failures: self.max_failures,
            setup_policy: self.setup_policy,
            fault_policy: self.fault_policy,
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            ..RunConfig::new(program_counter)
        };
        config.validate()?;
        Ok(config)
    }

    /// Corpus layout options.
    pub fn corpus_format(&self) -> CorpusFormat {
        CorpusFormat {
            memory_key: self.memory_key.clone(),
        }
    }
}
