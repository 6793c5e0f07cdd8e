//! RISC-V instruction decoder.
//!
//! Splits a 32-bit encoding into opcode, register indices, function codes, and the
//! sign-extended immediate for its format (R, I, S, B, U, J).

use super::opcodes::{
    OP_AUIPC, OP_BRANCH, OP_IMM, OP_IMM_32, OP_JAL, OP_JALR, OP_LOAD, OP_LUI, OP_STORE,
};

/// Bit mask for the opcode field (bits 0-6).
const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for a 5-bit register field.
const REG_MASK: u32 = 0x1F;
/// Bit mask for the funct3 field (bits 12-14).
const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for the funct7 field (bits 25-31).
const FUNCT7_MASK: u32 = 0x7F;

/// Total width of an instruction in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Bit mask for the U-type immediate (bits 12-31).
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// Field extraction for raw 32-bit encodings.
pub trait InstructionBits {
    /// Opcode field (bits 0-6).
    fn opcode(&self) -> u32;
    /// Destination register (bits 7-11).
    fn rd(&self) -> usize;
    /// First source register (bits 15-19).
    fn rs1(&self) -> usize;
    /// Second source register (bits 20-24).
    fn rs2(&self) -> usize;
    /// funct3 field (bits 12-14).
    fn funct3(&self) -> u32;
    /// funct7 field (bits 25-31).
    fn funct7(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }
}

/// Decoded instruction fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Raw 32-bit encoding.
    pub raw: u32,
    /// Opcode field.
    pub opcode: u32,
    /// Destination register index.
    pub rd: usize,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// funct3 field.
    pub funct3: u32,
    /// funct7 field.
    pub funct7: u32,
    /// Sign-extended immediate (0 for R-type and unknown opcodes).
    pub imm: i64,
}

/// Decodes a 32-bit instruction into its fields.
///
/// # Arguments
///
/// * `inst` - The raw encoding.
///
/// # Returns
///
/// A `Decoded` with the immediate sign-extended according to the opcode's format.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();

    let imm = match opcode {
        OP_IMM | OP_LOAD | OP_JALR | OP_IMM_32 => i_type_imm(inst),
        OP_STORE => s_type_imm(inst),
        OP_BRANCH => b_type_imm(inst),
        OP_LUI | OP_AUIPC => u_type_imm(inst),
        OP_JAL => j_type_imm(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: inst.rd(),
        rs1: inst.rs1(),
        rs2: inst.rs2(),
        funct3: inst.funct3(),
        funct7: inst.funct7(),
        imm,
    }
}

/// I-type: `imm[11:0] | rs1 | funct3 | rd | opcode`.
fn i_type_imm(inst: u32) -> i64 {
    ((inst as i32) >> 20) as i64
}

/// S-type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
fn s_type_imm(inst: u32) -> i64 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// B-type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
fn b_type_imm(inst: u32) -> i64 {
    let bit_11 = (inst >> 7) & 0x1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 0x1;

    let combined = (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1);
    sign_extend(combined, 13)
}

/// U-type: `imm[31:12] | rd | opcode`.
fn u_type_imm(inst: u32) -> i64 {
    ((inst & U_IMM_MASK) as i32) as i64
}

/// J-type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
fn j_type_imm(inst: u32) -> i64 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 0x1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 0x1;

    let combined = (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1);
    sign_extend(combined, 21)
}

/// Sign extends the low `bits` of `val` to 64 bits.
fn sign_extend(val: u32, bits: u32) -> i64 {
    let shift = INSTRUCTION_WIDTH - bits;
    ((val as i32) << shift >> shift) as i64
}
