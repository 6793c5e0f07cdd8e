//! # Coordinator Tests
//!
//! Scheduling, threshold abort, and error escalation, driven by the scripted mock
//! stepper. A final group runs real RISC-V vectors end to end.

use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use stepcheck_core::common::{ConfigError, HarnessError, SetupError, StepFault};
use stepcheck_core::report::{NullReporter, Reporter};
use stepcheck_core::run::{
    CaseResult, CaseVerdict, FaultPolicy, RunConfig, SetupPolicy, StatsSnapshot,
};
use stepcheck_core::stepper::RiscvStepper;
use stepcheck_core::{Coordinator, MachineState, RunStatus, TestCase};

use crate::common::encode::addi;
use crate::common::fixtures::{init_tracing, pc_case, pc_cases, rv32, with_instruction};
use crate::common::mocks::stepper::{Behavior, MockStepper};

/// Reporter that records every index it is handed.
#[derive(Debug, Default)]
struct Recorder {
    seen: Vec<(usize, bool)>,
    progress: Vec<StatsSnapshot>,
}

impl Reporter for Recorder {
    fn on_case(&mut self, result: &CaseResult<'_>) {
        self.seen.push((result.index(), result.passed()));
    }

    fn on_progress(&mut self, stats: &StatsSnapshot) {
        self.progress.push(*stats);
    }
}

fn config(concurrency: usize, max_failures: usize) -> RunConfig {
    init_tracing();
    RunConfig {
        concurrency,
        max_failures,
        ..RunConfig::new("pc")
    }
}

fn pc_of(index: usize) -> u64 {
    0x1000 + 0x10 * index as u64
}

// ──────────────────────────────────────────────────────────
// Scheduling
// ──────────────────────────────────────────────────────────

#[rstest]
fn all_pass_runs_every_case(#[values(1, 2, 4, 8)] concurrency: usize) {
    let descriptor = rv32();
    let stepper = MockStepper::new().with_delay(Duration::from_millis(1));
    let cases = pc_cases(20);
    let config = config(concurrency, 10);
    let mut recorder = Recorder::default();

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut recorder)
        .expect("run succeeds");

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.stats.submitted, 20);
    assert_eq!(outcome.stats.completed, 20);
    assert_eq!(outcome.stats.failed, 0);
    assert_eq!(outcome.stats.passed(), 20);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.exit_code(), 0);

    let mut indices: Vec<usize> = recorder.seen.iter().map(|&(index, _)| index).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
}

#[rstest]
fn every_task_gets_its_own_context(#[values(1, 3, 6)] concurrency: usize) {
    let descriptor = rv32();
    let stepper = MockStepper::new().with_delay(Duration::from_millis(2));
    let cases = pc_cases(12);
    let config = config(concurrency, 10);

    let _ = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(stepper.initialized(), 12);
    assert!(stepper.peak_live() <= concurrency);
    assert_eq!(stepper.live(), 0);
}

#[test]
fn runs_only_the_selected_range() {
    let descriptor = rv32();
    let stepper = MockStepper::new();
    let cases = pc_cases(10);
    let config = RunConfig {
        start_index: 3,
        end_index: Some(7),
        ..config(2, 10)
    };
    let mut recorder = Recorder::default();

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut recorder)
        .expect("run succeeds");

    assert_eq!(outcome.range, 3..7);
    assert_eq!(outcome.stats.completed, 4);
    let mut indices: Vec<usize> = recorder.seen.iter().map(|&(index, _)| index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![3, 4, 5, 6]);
}

#[test]
fn end_past_corpus_is_clamped() {
    let descriptor = rv32();
    let stepper = MockStepper::new();
    let cases = pc_cases(3);
    let config = RunConfig {
        end_index: Some(100),
        ..config(1, 10)
    };

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.range, 0..3);
    assert_eq!(outcome.status, RunStatus::Completed);
}

#[rstest]
#[case::empty_corpus(0, 0, None)]
#[case::start_past_end(5, 8, Some(3))]
fn empty_range_completes_with_zero_counts(
    #[case] corpus: usize,
    #[case] start: usize,
    #[case] end: Option<usize>,
) {
    let descriptor = rv32();
    let stepper = MockStepper::new();
    let cases = pc_cases(corpus);
    let config = RunConfig {
        start_index: start,
        end_index: end,
        ..config(4, 10)
    };

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.stats, StatsSnapshot::default());
    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(stepper.initialized(), 0);
}

#[test]
fn reports_progress_while_workers_are_busy() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with_delay(Duration::from_millis(30));
    let cases = pc_cases(3);
    let config = RunConfig {
        progress_interval: Duration::from_millis(5),
        ..config(1, 10)
    };
    let mut recorder = Recorder::default();

    let _ = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut recorder)
        .expect("run succeeds");

    assert!(!recorder.progress.is_empty());
}

#[test]
fn reports_progress_while_results_keep_arriving() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with_delay(Duration::from_millis(2));
    let cases = pc_cases(240);
    let config = RunConfig {
        progress_interval: Duration::from_millis(10),
        ..config(4, 10)
    };
    let mut recorder = Recorder::default();

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut recorder)
        .expect("run succeeds");

    // 240 cases of 2ms on 4 workers take well over one interval, and no single
    // receive ever waits out a full interval.
    assert!(outcome.elapsed >= Duration::from_millis(100));
    assert!(!recorder.progress.is_empty());
    assert_eq!(recorder.seen.len(), 240);
}

#[test]
fn elapsed_covers_the_whole_run() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with_delay(Duration::from_millis(10));
    let cases = pc_cases(3);
    let config = config(1, 10);

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert!(outcome.elapsed >= Duration::from_millis(30));
}

// ──────────────────────────────────────────────────────────
// Threshold
// ──────────────────────────────────────────────────────────

#[test]
fn three_case_scenario_aborts_after_first_failure() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with(pc_of(1), Behavior::Mismatch);
    let cases = pc_cases(3);
    let config = config(1, 1);
    let mut recorder = Recorder::default();

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut recorder)
        .expect("run succeeds");

    assert_eq!(outcome.status, RunStatus::Aborted);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.completed, 2);
    assert_eq!(outcome.stats.submitted, 2);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(recorder.seen, vec![(0, true), (1, false)]);

    let failure = &outcome.failures[0];
    assert_eq!(failure.index(), 1);
    assert!(matches!(failure.verdict, CaseVerdict::Fail(ref m) if m.len() == 1));
}

#[rstest]
fn threshold_bounds_admitted_tasks(#[values(1, 2, 4)] concurrency: usize) {
    let descriptor = rv32();
    let stepper = (0..40).fold(MockStepper::new(), |stepper, index| {
        stepper.with(pc_of(index), Behavior::Mismatch)
    });
    let cases = pc_cases(40);
    let max_failures = 3;
    let config = config(concurrency, max_failures);

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.status, RunStatus::Aborted);
    assert!(outcome.stats.failed >= max_failures);
    // Each worker can have at most one task in flight when the budget is spent.
    assert!(outcome.stats.submitted <= max_failures + concurrency - 1);
    assert_eq!(outcome.stats.completed, outcome.stats.submitted);
    assert_eq!(outcome.failures.len(), outcome.stats.failed);
}

#[test]
fn failures_below_threshold_still_complete() {
    let descriptor = rv32();
    let stepper = MockStepper::new()
        .with(pc_of(2), Behavior::Mismatch)
        .with(pc_of(5), Behavior::Mismatch);
    let cases = pc_cases(8);
    let config = config(2, 3);

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.stats.completed, 8);
    assert_eq!(outcome.stats.failed, 2);
    let mut failed: Vec<usize> = outcome.failures.iter().map(CaseResult::index).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![2, 5]);
}

// ──────────────────────────────────────────────────────────
// Escalation policies
// ──────────────────────────────────────────────────────────

#[test]
fn fault_is_a_failed_case_by_default() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with(pc_of(0), Behavior::Fault);
    let cases = pc_cases(2);
    let config = config(1, 10);

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.faulted, 1);
    assert_eq!(outcome.stats.completed, 2);
    assert!(matches!(outcome.failures[0].verdict, CaseVerdict::Fault(StepFault::Backend(_))));
    assert!(outcome.failures[0].actual.is_none());
}

#[test]
fn fault_aborts_run_under_abort_policy() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with(pc_of(1), Behavior::Fault);
    let cases = pc_cases(4);
    let config = RunConfig {
        fault_policy: FaultPolicy::Abort,
        ..config(1, 10)
    };

    let err = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .unwrap_err();

    assert!(matches!(err, HarnessError::Execution { index: 1, .. }), "{err}");
    assert_eq!(err.exit_code(), 4);
    assert_eq!(stepper.initialized(), 2);
}

#[test]
fn setup_error_is_fatal_by_default() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with(pc_of(2), Behavior::SetupError);
    let cases = pc_cases(5);
    let config = config(1, 10);

    let err = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .unwrap_err();

    match err {
        HarnessError::Setup { index, ref source } => {
            assert_eq!(index, 2);
            assert_eq!(source, &SetupError::UnknownRegister { name: "bogus".to_string() });
        }
        ref other => panic!("expected a setup error, got {other}"),
    }
    assert_eq!(err.exit_code(), 4);
    assert_eq!(stepper.initialized(), 3);
}

#[test]
fn setup_error_scored_as_failure_under_fail_policy() {
    let descriptor = rv32();
    let stepper = MockStepper::new().with(pc_of(2), Behavior::SetupError);
    let cases = pc_cases(5);
    let config = RunConfig {
        setup_policy: SetupPolicy::FailCase,
        ..config(2, 10)
    };

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.stats.completed, 5);
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.faulted, 0);
    assert!(matches!(outcome.failures[0].verdict, CaseVerdict::SetupFailed(_)));
}

#[rstest]
#[case::zero_concurrency(config(0, 10))]
#[case::zero_max_failures(config(1, 0))]
#[case::empty_pc(RunConfig::new(""))]
#[case::zero_progress_interval(RunConfig { progress_interval: Duration::ZERO, ..config(1, 10) })]
fn invalid_config_is_rejected_before_running(#[case] run_config: RunConfig) {
    let descriptor = rv32();
    let stepper = MockStepper::new();
    let cases = pc_cases(3);

    let err = Coordinator::new(&descriptor, &stepper, &run_config)
        .run(&cases, &mut NullReporter)
        .unwrap_err();

    assert!(matches!(err, HarnessError::Config(_)), "{err}");
    assert_eq!(err.exit_code(), 2);
    assert_eq!(stepper.initialized(), 0);
}

#[test]
fn zero_concurrency_reports_its_cause() {
    let err = config(0, 1).validate().unwrap_err();
    assert!(matches!(err, ConfigError::ZeroConcurrency));
}

#[test]
fn zero_progress_interval_reports_its_cause() {
    let run_config = RunConfig {
        progress_interval: Duration::ZERO,
        ..config(1, 1)
    };
    let err = run_config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::ZeroProgressInterval));
    assert_eq!(err.to_string(), "progress interval must be nonzero");
}

// ──────────────────────────────────────────────────────────
// End to end with the RISC-V stepper
// ──────────────────────────────────────────────────────────

fn addi_case(index: usize, result: u64) -> TestCase {
    let pc = 0x1000;
    let initial = with_instruction(
        MachineState::new().with_register("pc", pc).with_register("x1", 0),
        pc,
        addi(1, 0, 5),
    );
    TestCase {
        index,
        name: Some("addi x1, x0, 5".to_string()),
        initial,
        expected: MachineState::new()
            .with_register("pc", pc + 4)
            .with_register("x1", result),
    }
}

#[test]
fn riscv_vectors_pass_and_fail_as_recorded() {
    let descriptor = rv32();
    let stepper = RiscvStepper::new();
    let cases = vec![addi_case(0, 5), addi_case(1, 6), addi_case(2, 5)];
    let config = config(2, 10);

    let outcome = Coordinator::new(&descriptor, &stepper, &config)
        .run(&cases, &mut NullReporter)
        .expect("run succeeds");

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.stats.completed, 3);
    assert_eq!(outcome.stats.failed, 1);

    let failure = &outcome.failures[0];
    assert_eq!(failure.index(), 1);
    let actual = failure.actual.as_ref().expect("state captured");
    assert_eq!(actual.register("x1"), Some(5));
    assert_eq!(actual.register("pc"), Some(0x1004));
}

#[test]
fn riscv_unknown_register_is_fatal() {
    let descriptor = rv32();
    let stepper = RiscvStepper::new();
    let mut case = pc_case(0, 0x1000);
    case.initial.set_register("f1", 0);
    let config = config(1, 10);

    let err = Coordinator::new(&descriptor, &stepper, &config)
        .run(&[case], &mut NullReporter)
        .unwrap_err();

    assert!(matches!(err, HarnessError::Setup { index: 0, .. }), "{err}");
}
