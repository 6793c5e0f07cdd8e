//! Per-case task pipeline.
//!
//! One task runs one test case through a fresh context: initialize, load the initial
//! state, step exactly once, capture the expected keys, then score. Every stage that can
//! go wrong surfaces as a distinct `TaskOutcome` variant so policies can tell a bad
//! vector apart from a faulting backend.

use crate::arch::ArchitectureDescriptor;
use crate::common::{SetupError, StepFault};
use crate::compare::{Mismatch, compare};
use crate::state::{MachineState, TestCase};
use crate::stepper::{StepContext, Stepper, capture};

/// Raw result of running one case through a stepper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The instruction executed; holds the captured actual state.
    Completed(MachineState),
    /// The backend raised a decode or execute fault.
    Fault(StepFault),
    /// The context could not be built or seeded.
    Setup(SetupError),
}

/// Runs one case through a freshly initialized context.
///
/// The context is created, used, and dropped inside this call and never escapes it.
///
/// # Arguments
///
/// * `stepper` - Backend factory.
/// * `descriptor` - Shared architecture descriptor.
/// * `case` - The test vector.
/// * `pc_register` - Program counter register name, after mapping.
pub fn execute_case<S: Stepper>(
    stepper: &S,
    descriptor: &ArchitectureDescriptor,
    case: &TestCase,
    pc_register: &str,
) -> TaskOutcome {
    let mut context = match stepper.initialize(descriptor) {
        Ok(context) => context,
        Err(err) => return TaskOutcome::Setup(err),
    };

    if let Err(err) = context.load(&case.initial) {
        return TaskOutcome::Setup(err);
    }

    // A PC the backend cannot read would otherwise surface as a confusing step fault.
    if let Err(err) = context.read_register(pc_register) {
        return TaskOutcome::Setup(err);
    }

    if let Err(fault) = context.step(pc_register) {
        return TaskOutcome::Fault(fault);
    }

    match capture(&context, &case.expected) {
        Ok(actual) => TaskOutcome::Completed(actual),
        Err(err) => TaskOutcome::Setup(err),
    }
}

/// Scored verdict for one case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseVerdict {
    /// Every expected key matched.
    Pass,
    /// At least one expected key differed.
    Fail(Vec<Mismatch>),
    /// The backend faulted and the fault was scored as a failure.
    Fault(StepFault),
    /// The vector could not be set up and the error was scored as a failure.
    SetupFailed(SetupError),
}

impl CaseVerdict {
    /// Returns true for anything but `Pass`.
    pub fn is_failure(&self) -> bool {
        !matches!(self, CaseVerdict::Pass)
    }

    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            CaseVerdict::Pass => "pass",
            CaseVerdict::Fail(_) => "mismatch",
            CaseVerdict::Fault(_) => "fault",
            CaseVerdict::SetupFailed(_) => "setup",
        }
    }
}

/// Result of one case, tagged with the case it belongs to.
///
/// Borrows the case from the corpus so results can travel between threads without
/// copying the initial and expected states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseResult<'c> {
    /// The scored case.
    pub case: &'c TestCase,
    /// Verdict after comparison.
    pub verdict: CaseVerdict,
    /// Captured actual state, when the instruction executed.
    pub actual: Option<MachineState>,
}

impl<'c> CaseResult<'c> {
    /// Scores a task outcome against the case's expected state.
    ///
    /// # Arguments
    ///
    /// * `case` - The case the outcome belongs to.
    /// * `outcome` - What the task produced.
    /// * `word_size` - Architecture word size in bytes, for register masking.
    pub fn score(case: &'c TestCase, outcome: TaskOutcome, word_size: u32) -> Self {
        match outcome {
            TaskOutcome::Completed(actual) => {
                let mismatches = compare(&case.expected, &actual, word_size);
                let verdict = if mismatches.is_empty() {
                    CaseVerdict::Pass
                } else {
                    CaseVerdict::Fail(mismatches)
                };
                Self { case, verdict, actual: Some(actual) }
            }
            TaskOutcome::Fault(fault) => Self {
                case,
                verdict: CaseVerdict::Fault(fault),
                actual: None,
            },
            TaskOutcome::Setup(err) => Self {
                case,
                verdict: CaseVerdict::SetupFailed(err),
                actual: None,
            },
        }
    }

    /// Corpus index of the case.
    pub fn index(&self) -> usize {
        self.case.index
    }

    /// Returns true when the case passed.
    pub fn passed(&self) -> bool {
        !self.verdict.is_failure()
    }
}
