//! Single-instruction interpreter.
//!
//! Fetches the word at `pc`, decodes it, applies its effect to the context, and leaves
//! `pc` pointing at the next instruction. Every encoding the interpreter cannot execute
//! is reported as a `StepFault`; nothing is silently skipped.

use super::alu::{self, AluOp, Width};
use super::decode::{Decoded, decode};
use super::opcodes::{
    EBREAK, ECALL, OP_AUIPC, OP_BRANCH, OP_IMM, OP_IMM_32, OP_JAL, OP_JALR, OP_LOAD, OP_LUI,
    OP_MISC_MEM, OP_REG, OP_REG_32, OP_STORE, OP_SYSTEM, UNCOMPRESSED_MASK, funct3, funct7,
    mfunct3,
};
use super::{RiscvContext, Xlen};
use crate::common::StepFault;

/// Size of an uncompressed instruction in bytes.
const INSTRUCTION_BYTES: u64 = 4;

/// Instruction address alignment without the C extension.
const IALIGN_MASK: u64 = 0b11;

impl RiscvContext<'_> {
    /// Executes the instruction at `pc`.
    pub(super) fn execute_one(&mut self) -> Result<(), StepFault> {
        let pc = self.pc;
        if pc & IALIGN_MASK != 0 {
            return Err(StepFault::MisalignedTarget { pc, target: pc });
        }

        let raw = self.memory.read_le(pc, INSTRUCTION_BYTES as usize) as u32;
        if raw & UNCOMPRESSED_MASK != UNCOMPRESSED_MASK {
            return Err(StepFault::Unsupported { pc, raw });
        }

        let d = decode(raw);
        let next = self.execute(pc, &d)?;
        self.pc = next & self.xlen.mask();
        Ok(())
    }

    /// Applies one decoded instruction and returns the next PC.
    fn execute(&mut self, pc: u64, d: &Decoded) -> Result<u64, StepFault> {
        let illegal = StepFault::IllegalInstruction { pc, raw: d.raw };
        let fallthrough = pc.wrapping_add(INSTRUCTION_BYTES);
        let rv64 = self.xlen == Xlen::Rv64;

        match d.opcode {
            OP_LUI => {
                self.write_gpr(d.rd, d.imm as u64);
                Ok(fallthrough)
            }
            OP_AUIPC => {
                self.write_gpr(d.rd, pc.wrapping_add(d.imm as u64));
                Ok(fallthrough)
            }
            OP_JAL => {
                let target = self.checked_target(pc, pc.wrapping_add(d.imm as u64))?;
                self.write_gpr(d.rd, fallthrough);
                Ok(target)
            }
            OP_JALR => {
                if d.funct3 != funct3::JALR {
                    return Err(illegal);
                }
                let base = self.read_gpr(d.rs1);
                let target = self.checked_target(pc, base.wrapping_add(d.imm as u64) & !1)?;
                self.write_gpr(d.rd, fallthrough);
                Ok(target)
            }
            OP_BRANCH => {
                let a = self.read_gpr(d.rs1);
                let b = self.read_gpr(d.rs2);
                let (sa, sb) = self.signed_pair(a, b);
                let taken = match d.funct3 {
                    funct3::BEQ => a == b,
                    funct3::BNE => a != b,
                    funct3::BLT => sa < sb,
                    funct3::BGE => sa >= sb,
                    funct3::BLTU => a < b,
                    funct3::BGEU => a >= b,
                    _ => return Err(illegal),
                };
                if taken {
                    self.checked_target(pc, pc.wrapping_add(d.imm as u64))
                } else {
                    Ok(fallthrough)
                }
            }
            OP_LOAD => {
                let address = self.read_gpr(d.rs1).wrapping_add(d.imm as u64);
                let value = match d.funct3 {
                    funct3::LB => self.memory.read_le(address, 1) as i8 as i64 as u64,
                    funct3::LH => self.memory.read_le(address, 2) as i16 as i64 as u64,
                    funct3::LW => self.memory.read_le(address, 4) as i32 as i64 as u64,
                    funct3::LD if rv64 => self.memory.read_le(address, 8),
                    funct3::LBU => self.memory.read_le(address, 1),
                    funct3::LHU => self.memory.read_le(address, 2),
                    funct3::LWU if rv64 => self.memory.read_le(address, 4),
                    _ => return Err(illegal),
                };
                self.write_gpr(d.rd, value);
                Ok(fallthrough)
            }
            OP_STORE => {
                let address = self.read_gpr(d.rs1).wrapping_add(d.imm as u64);
                let value = self.read_gpr(d.rs2);
                let len = match d.funct3 {
                    funct3::SB => 1,
                    funct3::SH => 2,
                    funct3::SW => 4,
                    funct3::SD if rv64 => 8,
                    _ => return Err(illegal),
                };
                self.memory.write_le(address, len, value);
                Ok(fallthrough)
            }
            OP_IMM => {
                let a = self.read_gpr(d.rs1);
                let op = self.imm_op(d, false).ok_or(illegal)?;
                let b = if matches!(op, AluOp::Sll | AluOp::Srl | AluOp::Sra) {
                    d.imm as u64 & self.shamt_mask(false)
                } else {
                    d.imm as u64
                };
                self.write_gpr(d.rd, alu::execute(op, a, b, self.xlen.into()));
                Ok(fallthrough)
            }
            OP_IMM_32 if rv64 => {
                let a = self.read_gpr(d.rs1);
                let op = self.imm_op(d, true).ok_or(illegal)?;
                let b = if matches!(op, AluOp::Sll | AluOp::Srl | AluOp::Sra) {
                    d.imm as u64 & self.shamt_mask(true)
                } else {
                    d.imm as u64
                };
                self.write_gpr(d.rd, alu::execute(op, a, b, Width::Word));
                Ok(fallthrough)
            }
            OP_REG => {
                let op = reg_op(d, false).ok_or(illegal)?;
                let (a, b) = (self.read_gpr(d.rs1), self.read_gpr(d.rs2));
                let result = alu::execute(op, a, b, self.xlen.into());
                self.write_gpr(d.rd, result);
                Ok(fallthrough)
            }
            OP_REG_32 if rv64 => {
                let op = reg_op(d, true).ok_or(illegal)?;
                let (a, b) = (self.read_gpr(d.rs1), self.read_gpr(d.rs2));
                let result = alu::execute(op, a, b, Width::Word);
                self.write_gpr(d.rd, result);
                Ok(fallthrough)
            }
            OP_MISC_MEM => match d.funct3 {
                funct3::FENCE | funct3::FENCE_I => Ok(fallthrough),
                _ => Err(illegal),
            },
            OP_SYSTEM => match d.raw {
                ECALL => Err(StepFault::EnvironmentCall { pc }),
                EBREAK => Err(StepFault::Breakpoint { pc }),
                raw => Err(StepFault::Unsupported { pc, raw }),
            },
            _ => Err(illegal),
        }
    }

    /// Validates a control transfer target.
    fn checked_target(&self, pc: u64, target: u64) -> Result<u64, StepFault> {
        let target = target & self.xlen.mask();
        if target & IALIGN_MASK == 0 {
            Ok(target)
        } else {
            Err(StepFault::MisalignedTarget { pc, target })
        }
    }

    /// Reinterprets two register values as signed at the current XLEN.
    fn signed_pair(&self, a: u64, b: u64) -> (i64, i64) {
        match self.xlen {
            Xlen::Rv32 => (a as i32 as i64, b as i32 as i64),
            Xlen::Rv64 => (a as i64, b as i64),
        }
    }

    /// Shift amount mask for immediate shifts.
    fn shamt_mask(&self, word: bool) -> u64 {
        if word || self.xlen == Xlen::Rv32 { 0x1F } else { 0x3F }
    }

    /// Selects the ALU operation for `OP-IMM` and `OP-IMM-32`.
    ///
    /// Shift encodings carry their selector in the bits above the shift amount; any
    /// nonzero bit there other than the SRAI marker is illegal.
    fn imm_op(&self, d: &Decoded, word: bool) -> Option<AluOp> {
        let upper = (d.imm as u64 & 0xFFF) & !self.shamt_mask(word);
        // SRAI sets bit 10 of the immediate (funct7 bit 5).
        let arithmetic = 1 << 10;

        match d.funct3 {
            funct3::ADD_SUB => Some(AluOp::Add),
            funct3::SLL => (upper == 0).then_some(AluOp::Sll),
            funct3::SRL_SRA if upper == 0 => Some(AluOp::Srl),
            funct3::SRL_SRA if upper == arithmetic => Some(AluOp::Sra),
            _ if word => None,
            funct3::SLT => Some(AluOp::Slt),
            funct3::SLTU => Some(AluOp::Sltu),
            funct3::XOR => Some(AluOp::Xor),
            funct3::OR => Some(AluOp::Or),
            funct3::AND => Some(AluOp::And),
            _ => None,
        }
    }
}

/// Selects the ALU operation for `OP` and `OP-32`.
fn reg_op(d: &Decoded, word: bool) -> Option<AluOp> {
    match (d.funct7, d.funct3) {
        (funct7::DEFAULT, funct3::ADD_SUB) => Some(AluOp::Add),
        (funct7::ALT, funct3::ADD_SUB) => Some(AluOp::Sub),
        (funct7::DEFAULT, funct3::SLL) => Some(AluOp::Sll),
        (funct7::DEFAULT, funct3::SRL_SRA) => Some(AluOp::Srl),
        (funct7::ALT, funct3::SRL_SRA) => Some(AluOp::Sra),
        (funct7::M_EXTENSION, mfunct3::MUL) => Some(AluOp::Mul),
        (funct7::M_EXTENSION, mfunct3::DIV) => Some(AluOp::Div),
        (funct7::M_EXTENSION, mfunct3::DIVU) => Some(AluOp::Divu),
        (funct7::M_EXTENSION, mfunct3::REM) => Some(AluOp::Rem),
        (funct7::M_EXTENSION, mfunct3::REMU) => Some(AluOp::Remu),
        _ if word => None,
        (funct7::DEFAULT, funct3::SLT) => Some(AluOp::Slt),
        (funct7::DEFAULT, funct3::SLTU) => Some(AluOp::Sltu),
        (funct7::DEFAULT, funct3::XOR) => Some(AluOp::Xor),
        (funct7::DEFAULT, funct3::OR) => Some(AluOp::Or),
        (funct7::DEFAULT, funct3::AND) => Some(AluOp::And),
        (funct7::M_EXTENSION, mfunct3::MULH) => Some(AluOp::Mulh),
        (funct7::M_EXTENSION, mfunct3::MULHSU) => Some(AluOp::Mulhsu),
        (funct7::M_EXTENSION, mfunct3::MULHU) => Some(AluOp::Mulhu),
        _ => None,
    }
}
