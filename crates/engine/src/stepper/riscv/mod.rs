//! Built-in RISC-V stepper.
//!
//! Executes exactly one RV32I or RV64IM instruction per step. The register width comes
//! from the descriptor's word size (4 bytes for RV32, 8 for RV64). It provides:
//! 1. **Decode:** Field extraction and immediate sign extension.
//! 2. **ALU:** Base integer and M-extension arithmetic.
//! 3. **Execute:** One-instruction interpreter with explicit faults.
//! 4. **Context:** Per-task register file and sparse memory.

/// Register naming (numeric and ABI).
pub mod abi;

/// Integer ALU.
pub mod alu;

/// Instruction decoder.
pub mod decode;

/// Single-instruction interpreter.
pub mod execute;

/// Sparse byte-addressed memory.
pub mod memory;

/// Opcode and function code constants.
pub mod opcodes;

use crate::arch::{ArchInfo, ArchitectureDescriptor};
use crate::common::{SetupError, StepFault};
use crate::state::MachineState;
use crate::stepper::{StepContext, Stepper};

use abi::{GPR_COUNT, REG_ZERO, Register};
use memory::SparseMemory;

/// Register width of the modelled hart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Xlen {
    /// 32-bit registers and addresses.
    Rv32,
    /// 64-bit registers and addresses.
    Rv64,
}

impl Xlen {
    /// Maps a descriptor word size (bytes) to a register width.
    pub fn from_word_size(word_size: u32) -> Option<Self> {
        match word_size {
            4 => Some(Xlen::Rv32),
            8 => Some(Xlen::Rv64),
            _ => None,
        }
    }

    /// Mask covering one register.
    pub fn mask(self) -> u64 {
        match self {
            Xlen::Rv32 => u64::from(u32::MAX),
            Xlen::Rv64 => u64::MAX,
        }
    }
}

/// Factory for RISC-V decode contexts.
#[derive(Clone, Copy, Debug, Default)]
pub struct RiscvStepper;

impl RiscvStepper {
    /// Creates the stepper.
    pub fn new() -> Self {
        Self
    }
}

impl Stepper for RiscvStepper {
    type Context<'d> = RiscvContext<'d>;

    fn name(&self) -> &str {
        "riscv"
    }

    fn initialize<'d>(
        &self,
        descriptor: &'d ArchitectureDescriptor,
    ) -> Result<Self::Context<'d>, SetupError> {
        let info = descriptor.info();

        if info.big_endian {
            return Err(SetupError::UnsupportedArchitecture {
                reason: "RISC-V backend is little-endian only".to_string(),
            });
        }

        let xlen = Xlen::from_word_size(info.word_size).ok_or_else(|| {
            SetupError::UnsupportedArchitecture {
                reason: format!(
                    "RISC-V backend needs a word size of 4 or 8 bytes, descriptor declares {}",
                    info.word_size
                ),
            }
        })?;

        Ok(RiscvContext {
            info,
            xlen,
            regs: [0; GPR_COUNT],
            pc: 0,
            memory: SparseMemory::new(xlen.mask()),
        })
    }
}

/// One task's RISC-V hart: register file, PC, and memory image.
///
/// Borrows the probed metadata from the shared descriptor and owns everything it mutates.
#[derive(Debug)]
pub struct RiscvContext<'d> {
    info: &'d ArchInfo,
    xlen: Xlen,
    regs: [u64; GPR_COUNT],
    pc: u64,
    memory: SparseMemory,
}

impl RiscvContext<'_> {
    /// Register width of this hart.
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Current program counter.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Reads a general-purpose register. `x0` always reads zero.
    #[inline]
    pub(crate) fn read_gpr(&self, idx: usize) -> u64 {
        if idx == REG_ZERO { 0 } else { self.regs[idx] }
    }

    /// Writes a general-purpose register, truncated to XLEN. Writes to `x0` are ignored.
    #[inline]
    pub(crate) fn write_gpr(&mut self, idx: usize, value: u64) {
        if idx != REG_ZERO {
            self.regs[idx] = value & self.xlen.mask();
        }
    }

    fn lookup(name: &str) -> Result<Register, SetupError> {
        abi::resolve(name).ok_or_else(|| SetupError::UnknownRegister {
            name: name.to_string(),
        })
    }
}

impl StepContext for RiscvContext<'_> {
    fn load(&mut self, state: &MachineState) -> Result<(), SetupError> {
        for (name, &value) in &state.registers {
            match Self::lookup(name)? {
                Register::Pc => self.pc = value & self.xlen.mask(),
                Register::Gpr(idx) => self.write_gpr(idx, value),
            }
        }

        for (&address, &byte) in &state.memory {
            self.memory.write_u8(address, byte);
        }

        Ok(())
    }

    fn step(&mut self, pc_register: &str) -> Result<(), StepFault> {
        if abi::resolve(pc_register) != Some(Register::Pc) {
            return Err(StepFault::Backend(format!(
                "`{pc_register}` is not the RISC-V program counter"
            )));
        }

        tracing::trace!(pc = self.pc, space = %self.info.default_space, "stepping");
        self.execute_one()
    }

    fn read_register(&self, name: &str) -> Result<u64, SetupError> {
        Ok(match Self::lookup(name)? {
            Register::Pc => self.pc,
            Register::Gpr(idx) => self.read_gpr(idx),
        })
    }

    fn read_memory(&self, address: u64) -> u8 {
        self.memory.read_u8(address)
    }
}
