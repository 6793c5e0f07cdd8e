//! Run reporting.
//!
//! Results reach a `Reporter` on the coordinator thread, one call per finished case, in
//! arrival order. It provides:
//! 1. **Console:** `[+] N) SUCCESS` / `[-] N) FAIL` lines with tab-indented state
//!    dumps of the initial, expected, and emulated state for every failure.
//! 2. **Summary:** Aggregate submitted / completed / failed counts and wall time.
//! 3. **JSON:** A serializable `RunReport` with every failure and its mismatches.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::compare::Mismatch;
use crate::run::{CaseResult, CaseVerdict, RunOutcome, RunStatus, StatsSnapshot};
use crate::state::MachineState;

/// Receives results while a run is in progress.
pub trait Reporter {
    /// Called once for every finished case.
    fn on_case(&mut self, result: &CaseResult<'_>);

    /// Called periodically while workers are busy.
    fn on_progress(&mut self, stats: &StatsSnapshot);
}

/// Reporter that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_case(&mut self, _result: &CaseResult<'_>) {}

    fn on_progress(&mut self, _stats: &StatsSnapshot) {}
}

/// Formats a state as a tab-indented register and RAM dump.
///
/// Values are printed in decimal, one entry per line:
///
/// ```text
/// 	Registers:
/// 		pc: 4096
/// 	RAM:
/// 		4096: 147
/// ```
pub fn format_state(state: &MachineState) -> String {
    let mut out = String::from("\tRegisters:\n");
    for (name, value) in &state.registers {
        let _ = writeln!(out, "\t\t{name}: {value}");
    }
    out.push_str("\tRAM:\n");
    for (address, value) in &state.memory {
        let _ = writeln!(out, "\t\t{address}: {value}");
    }
    out
}

/// Human-readable console reporter.
///
/// Writes to any `io::Write`; the CLI hands it stdout. Write errors do not interrupt
/// the run; the first one is kept and can be collected with [`ConsoleReporter::finish`].
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    out: W,
    quiet: bool,
    error: Option<io::Error>,
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a reporter writing to `out`.
    ///
    /// # Arguments
    ///
    /// * `out` - Destination.
    /// * `quiet` - Suppress per-case SUCCESS lines.
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet, error: None }
    }

    /// Flushes the output and returns the first write error, if any.
    ///
    /// # Errors
    ///
    /// The first I/O error seen while reporting or flushing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_all(text.as_bytes()) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_case(&mut self, result: &CaseResult<'_>) {
        let index = result.index();
        if result.passed() {
            if !self.quiet {
                self.emit(&format!("[+] {index}) SUCCESS\n"));
            }
            return;
        }
        let text = format_failure(result);
        self.emit(&text);
    }

    fn on_progress(&mut self, stats: &StatsSnapshot) {
        self.emit(&format!(
            "Test cases: {}/{} Fail cases: {}\n",
            stats.completed, stats.submitted, stats.failed
        ));
    }
}

/// Full failure block for one case.
fn format_failure(result: &CaseResult<'_>) -> String {
    let case = result.case;
    let mut out = format!("[-] {}) FAIL\n", case.index);
    if let Some(name) = &case.name {
        let _ = writeln!(out, "Name: {name}");
    }

    match &result.verdict {
        CaseVerdict::Pass => {}
        CaseVerdict::Fail(mismatches) => {
            for mismatch in mismatches {
                let _ = writeln!(out, "{mismatch}");
            }
        }
        CaseVerdict::Fault(fault) => {
            let _ = writeln!(out, "FAULT: {fault}");
        }
        CaseVerdict::SetupFailed(err) => {
            let _ = writeln!(out, "SETUP ERROR: {err}");
        }
    }

    out.push_str("Initial State:\n");
    out.push_str(&format_state(&case.initial));
    out.push('\n');

    out.push_str("Final (Expected) State:\n");
    out.push_str(&format_state(&case.expected));
    out.push('\n');

    out.push_str("Emulator:\n");
    match &result.actual {
        Some(actual) => out.push_str(&format_state(actual)),
        None => out.push_str("\t(no state captured)\n"),
    }
    out.push('\n');
    out
}

/// Writes the aggregate counts and wall time printed at the end of a run.
///
/// # Errors
///
/// Any error from `out`.
pub fn write_summary<W: Write>(
    out: &mut W,
    stats: &StatsSnapshot,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out, "Cases submitted {}", stats.submitted)?;
    writeln!(out, "Completed cases {}", stats.completed)?;
    writeln!(out, "Fail cases {}", stats.failed)?;
    writeln!(out, "Elapsed {:.3}s wall", elapsed.as_secs_f64())
}

/// One failed case in a `RunReport`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Corpus index.
    pub index: usize,
    /// Record name, when the corpus gave one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `mismatch`, `fault`, or `setup`.
    pub verdict: &'static str,
    /// Fault or setup error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// State mismatches, empty for faults and setup errors.
    pub mismatches: Vec<Mismatch>,
    /// Initial state of the vector.
    pub initial: MachineState,
    /// Expected state of the vector.
    pub expected: MachineState,
    /// Captured state, when the instruction executed.
    pub actual: Option<MachineState>,
}

impl From<&CaseResult<'_>> for FailureRecord {
    fn from(result: &CaseResult<'_>) -> Self {
        let (detail, mismatches) = match &result.verdict {
            CaseVerdict::Pass => (None, Vec::new()),
            CaseVerdict::Fail(mismatches) => (None, mismatches.clone()),
            CaseVerdict::Fault(fault) => (Some(fault.to_string()), Vec::new()),
            CaseVerdict::SetupFailed(err) => (Some(err.to_string()), Vec::new()),
        };

        Self {
            index: result.case.index,
            name: result.case.name.clone(),
            verdict: result.verdict.label(),
            detail,
            mismatches,
            initial: result.case.initial.clone(),
            expected: result.case.expected.clone(),
            actual: result.actual.clone(),
        }
    }
}

/// Serializable summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Backend name.
    pub backend: String,
    /// Completed or threshold-aborted.
    pub status: RunStatus,
    /// First scheduled index.
    pub start: usize,
    /// One past the last scheduled index.
    pub end: usize,
    /// Final counters.
    pub stats: StatsSnapshot,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
    /// Every failed case.
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    /// Builds a report from a run outcome.
    pub fn new(backend: impl Into<String>, outcome: &RunOutcome<'_>) -> Self {
        Self {
            backend: backend.into(),
            status: outcome.status,
            start: outcome.range.start,
            end: outcome.range.end,
            stats: outcome.stats,
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            failures: outcome.failures.iter().map(FailureRecord::from).collect(),
        }
    }

    /// Writes the report as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Any error creating the directory, serializing, or writing the file.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, raw)?;
        tracing::info!(path = %path.display(), failures = self.failures.len(), "wrote report");
        Ok(())
    }
}
