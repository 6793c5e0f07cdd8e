//! Concurrent run coordinator.
//!
//! Drives a range of the corpus through a stepper on a dedicated `rayon` pool sized to
//! the configured concurrency. It provides:
//! 1. **Work Queue:** A shared atomic cursor over the case range; each worker claims the
//!    next index until the range is exhausted.
//! 2. **Admission:** Before claiming a case a worker checks the cancellation flag and
//!    the failure budget. Once the budget is spent nothing new starts; tasks already
//!    running finish and are counted.
//! 3. **Results:** Workers send `CaseResult`s over a channel to the calling thread,
//!    which owns the reporter. The loop ends when every worker has dropped its sender.
//!    Progress is reported on a fixed deadline, whether or not results keep arriving.
//! 4. **Escalation:** Setup errors and faults are either scored or made fatal according
//!    to the configured policies. The first fatal error cancels the run.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::config::{FaultPolicy, RunConfig, SetupPolicy};
use super::stats::{RunStats, StatsSnapshot};
use super::task::{CaseResult, CaseVerdict, TaskOutcome, execute_case};
use crate::arch::ArchitectureDescriptor;
use crate::common::HarnessError;
use crate::report::Reporter;
use crate::state::TestCase;
use crate::stepper::Stepper;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every case in the range ran and the failure budget was not exhausted.
    Completed,
    /// The failure budget was exhausted; remaining cases were not started.
    Aborted,
}

/// Result of a run that was not stopped by a fatal error.
#[derive(Clone, Debug)]
pub struct RunOutcome<'c> {
    /// Final counters.
    pub stats: StatsSnapshot,
    /// Completed or threshold-aborted.
    pub status: RunStatus,
    /// Every failed case, in the order results arrived.
    pub failures: Vec<CaseResult<'c>>,
    /// Index range that was scheduled.
    pub range: Range<usize>,
    /// Wall time from pool start to the last result.
    pub elapsed: Duration,
}

impl RunOutcome<'_> {
    /// Process exit code: 0 for a completed run, 1 for a threshold abort.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Completed => 0,
            RunStatus::Aborted => 1,
        }
    }
}

/// State shared by all workers of one run.
#[derive(Debug)]
struct Shared {
    stats: RunStats,
    cursor: AtomicUsize,
    end: usize,
    cancel: AtomicBool,
    fatal: Mutex<Option<HarnessError>>,
}

impl Shared {
    /// Records the first fatal error and raises the cancellation flag.
    fn abort(&self, err: HarnessError) {
        tracing::warn!(error = %err, "fatal error, cancelling run");
        {
            let mut slot = self.fatal.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.cancel.store(true, Ordering::Release);
    }
}

/// Runs a corpus range against one stepper.
#[derive(Debug)]
pub struct Coordinator<'a, S> {
    descriptor: &'a ArchitectureDescriptor,
    stepper: &'a S,
    config: &'a RunConfig,
}

impl<'a, S: Stepper> Coordinator<'a, S> {
    /// Creates a coordinator.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Shared, already probed architecture descriptor.
    /// * `stepper` - Backend factory; each task gets its own context from it.
    /// * `config` - Run parameters.
    pub fn new(
        descriptor: &'a ArchitectureDescriptor,
        stepper: &'a S,
        config: &'a RunConfig,
    ) -> Self {
        Self { descriptor, stepper, config }
    }

    /// Runs the configured range of `cases`, reporting each result as it arrives.
    ///
    /// Blocks until every worker has finished.
    ///
    /// # Errors
    ///
    /// `HarnessError::Config` for an invalid configuration, `HarnessError::Setup` or
    /// `HarnessError::Execution` when a policy makes a per-case error fatal,
    /// `HarnessError::WorkerPool` if the pool threads cannot be started. A fatal error
    /// carries no partial statistics.
    pub fn run<'c, R: Reporter + ?Sized>(
        &self,
        cases: &'c [TestCase],
        reporter: &mut R,
    ) -> Result<RunOutcome<'c>, HarnessError> {
        self.config.validate()?;

        let range = self.config.range(cases.len());
        if self.config.start_index > range.end {
            tracing::warn!(
                start = self.config.start_index,
                end = range.end,
                "start index is past the end of the range, nothing to run"
            );
        }

        let workers = self.config.concurrency.min(range.len());
        tracing::info!(
            backend = self.stepper.name(),
            start = range.start,
            end = range.end,
            workers,
            max_failures = self.config.max_failures,
            "starting run"
        );

        let shared = Shared {
            stats: RunStats::new(),
            cursor: AtomicUsize::new(range.start),
            end: range.end,
            cancel: AtomicBool::new(false),
            fatal: Mutex::new(None),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("stepcheck-worker-{i}"))
            .build()?;

        let started = Instant::now();
        let interval = self.config.progress_interval;
        let mut failures = Vec::new();

        // The closure runs on the calling thread, which owns the reporter; only the
        // spawned workers occupy pool threads.
        pool.in_place_scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for _ in 0..workers {
                let tx = tx.clone();
                let shared = &shared;
                scope.spawn(move |_| self.work(cases, shared, &tx));
            }
            drop(tx);

            // `None` when the interval is too large to ever elapse.
            let mut next_progress = started.checked_add(interval);
            loop {
                let received = match next_progress {
                    Some(deadline) => {
                        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    }
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match received {
                    Ok(result) => {
                        reporter.on_case(&result);
                        if !result.passed() {
                            failures.push(result);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                let now = Instant::now();
                if next_progress.is_some_and(|deadline| now >= deadline) {
                    let snapshot = shared.stats.snapshot();
                    tracing::info!(
                        submitted = snapshot.submitted,
                        completed = snapshot.completed,
                        failed = snapshot.failed,
                        "progress"
                    );
                    reporter.on_progress(&snapshot);
                    next_progress = now.checked_add(interval);
                }
            }
        });

        let fatal = shared.fatal.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = fatal {
            return Err(err);
        }

        let elapsed = started.elapsed();
        let stats = shared.stats.snapshot();
        let status = if stats.failed < self.config.max_failures && stats.completed == range.len()
        {
            RunStatus::Completed
        } else {
            RunStatus::Aborted
        };

        tracing::info!(
            submitted = stats.submitted,
            completed = stats.completed,
            failed = stats.failed,
            status = ?status,
            elapsed_ms = elapsed.as_millis(),
            "run finished"
        );

        Ok(RunOutcome {
            stats,
            status,
            failures,
            range,
            elapsed,
        })
    }

    /// Worker loop: claim, run, score, and send until the queue is empty or the run
    /// stops admitting tasks.
    fn work<'c>(&self, cases: &'c [TestCase], shared: &Shared, tx: &Sender<CaseResult<'c>>) {
        let pc_register = self.config.program_counter.as_str();
        let word_size = self.descriptor.word_size();

        loop {
            if shared.cancel.load(Ordering::Acquire)
                || shared.stats.failed() >= self.config.max_failures
            {
                break;
            }

            let index = shared.cursor.fetch_add(1, Ordering::AcqRel);
            let Some(case) = cases.get(index).filter(|_| index < shared.end) else {
                break;
            };

            shared.stats.record_submitted();
            tracing::debug!(index, "running case");

            let outcome = execute_case(self.stepper, self.descriptor, case, pc_register);
            match (&outcome, self.config.setup_policy, self.config.fault_policy) {
                (TaskOutcome::Setup(err), SetupPolicy::AbortRun, _) => {
                    shared.abort(HarnessError::Setup {
                        index: case.index,
                        source: err.clone(),
                    });
                    break;
                }
                (TaskOutcome::Fault(fault), _, FaultPolicy::Abort) => {
                    shared.abort(HarnessError::Execution {
                        index: case.index,
                        source: fault.clone(),
                    });
                    break;
                }
                _ => {}
            }

            let result = CaseResult::score(case, outcome, word_size);
            if result.verdict.is_failure() {
                let failed = shared.stats.record_failed();
                if matches!(result.verdict, CaseVerdict::Fault(_)) {
                    shared.stats.record_faulted();
                }
                tracing::debug!(index, failed, verdict = result.verdict.label(), "case failed");
            }
            shared.stats.record_completed();

            if tx.send(result).is_err() {
                break;
            }
        }
    }
}
