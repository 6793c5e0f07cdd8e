//! Instruction stepper interface.
//!
//! A stepper is the backend under test. The coordinator never shares a decode context
//! between tasks: every task calls [`Stepper::initialize`] and receives a context it
//! owns exclusively. The context may borrow the shared descriptor (`'d`) but keeps all
//! of its mutable state to itself, so the borrow checker enforces one owner per context.
//!
//! # Backends
//!
//! * `riscv`: Built-in RV32I / RV64IM interpreter.

/// Built-in RISC-V backend.
pub mod riscv;

use crate::arch::ArchitectureDescriptor;
use crate::common::{SetupError, StepFault};
use crate::state::MachineState;

pub use riscv::RiscvStepper;

/// Factory for per-task decode contexts.
///
/// Implementors are shared by reference across worker threads and must therefore be
/// `Sync`; the contexts they produce are not required to be.
pub trait Stepper: Sync {
    /// Per-task decode and execution context borrowing the descriptor.
    type Context<'d>: StepContext;

    /// Short backend name for logs and reports.
    fn name(&self) -> &str;

    /// Builds a fresh context for one task.
    ///
    /// # Errors
    ///
    /// `SetupError::UnsupportedArchitecture` when the backend cannot model the
    /// descriptor's architecture.
    fn initialize<'d>(
        &self,
        descriptor: &'d ArchitectureDescriptor,
    ) -> Result<Self::Context<'d>, SetupError>;
}

/// One exclusively owned decode/execute context.
pub trait StepContext {
    /// Seeds registers and memory from a state.
    ///
    /// # Errors
    ///
    /// `SetupError::UnknownRegister` for a register the backend does not have.
    fn load(&mut self, state: &MachineState) -> Result<(), SetupError>;

    /// Executes exactly one instruction starting at the value of `pc_register`.
    ///
    /// After a successful step `pc_register` holds the address of the next instruction.
    ///
    /// # Errors
    ///
    /// A `StepFault` for any decode or execute fault. A fault is never reported as an
    /// unchanged state.
    fn step(&mut self, pc_register: &str) -> Result<(), StepFault>;

    /// Reads a register by name.
    ///
    /// # Errors
    ///
    /// `SetupError::UnknownRegister` for a register the backend does not have.
    fn read_register(&self, name: &str) -> Result<u64, SetupError>;

    /// Reads one byte of the default address space. Unwritten bytes read as zero.
    fn read_memory(&self, address: u64) -> u8;
}

/// Captures the actual state restricted to exactly the keys of `expected`.
///
/// Every expected address is read from the context, so a byte the backend never
/// touched is captured as 0 rather than left out.
///
/// # Errors
///
/// `SetupError::UnknownRegister` if `expected` names a register the backend lacks.
pub fn capture<C: StepContext + ?Sized>(
    context: &C,
    expected: &MachineState,
) -> Result<MachineState, SetupError> {
    let mut actual = MachineState::new();

    for name in expected.registers.keys() {
        actual.set_register(name.clone(), context.read_register(name)?);
    }

    for &address in expected.memory.keys() {
        actual.set_memory(address, context.read_memory(address));
    }

    Ok(actual)
}
