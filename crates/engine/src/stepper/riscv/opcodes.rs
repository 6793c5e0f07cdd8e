//! RISC-V opcode and function code constants.
//!
//! Covers the base integer set (I), its RV64 word forms, the multiply/divide
//! extension (M), and the system instructions the stepper recognises.

/// Load instructions (LB, LH, LW, LD, etc.).
pub const OP_LOAD: u32 = 0b0000011;

/// Memory ordering instructions (FENCE, FENCE.I).
pub const OP_MISC_MEM: u32 = 0b0001111;

/// Immediate arithmetic instructions (ADDI, ANDI, SLLI, etc.).
pub const OP_IMM: u32 = 0b0010011;

/// Add Upper Immediate to PC (AUIPC).
pub const OP_AUIPC: u32 = 0b0010111;

/// 32-bit Immediate arithmetic (ADDIW, SLLIW, etc.) - RV64 only.
pub const OP_IMM_32: u32 = 0b0011011;

/// Store instructions (SB, SH, SW, SD).
pub const OP_STORE: u32 = 0b0100011;

/// Register-Register arithmetic (ADD, SUB, SLL, etc.).
pub const OP_REG: u32 = 0b0110011;

/// Load Upper Immediate (LUI).
pub const OP_LUI: u32 = 0b0110111;

/// 32-bit Register-Register arithmetic (ADDW, SUBW, etc.) - RV64 only.
pub const OP_REG_32: u32 = 0b0111011;

/// Conditional Branch instructions (BEQ, BNE, etc.).
pub const OP_BRANCH: u32 = 0b1100011;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0b1100111;

/// Jump and Link (JAL).
pub const OP_JAL: u32 = 0b1101111;

/// System instructions (ECALL, EBREAK, CSR access).
pub const OP_SYSTEM: u32 = 0b1110011;

/// Environment Call (ECALL).
pub const ECALL: u32 = 0x0000_0073;

/// Environment Break (EBREAK).
pub const EBREAK: u32 = 0x0010_0073;

/// Low two bits of every 32-bit encoding; anything else is a compressed instruction.
pub const UNCOMPRESSED_MASK: u32 = 0b11;

/// Base integer `funct3` values.
pub mod funct3 {
    /// Load Byte (signed).
    pub const LB: u32 = 0b000;
    /// Load Halfword (signed).
    pub const LH: u32 = 0b001;
    /// Load Word (signed).
    pub const LW: u32 = 0b010;
    /// Load Doubleword.
    pub const LD: u32 = 0b011;
    /// Load Byte Unsigned.
    pub const LBU: u32 = 0b100;
    /// Load Halfword Unsigned.
    pub const LHU: u32 = 0b101;
    /// Load Word Unsigned.
    pub const LWU: u32 = 0b110;

    /// Store Byte.
    pub const SB: u32 = 0b000;
    /// Store Halfword.
    pub const SH: u32 = 0b001;
    /// Store Word.
    pub const SW: u32 = 0b010;
    /// Store Doubleword.
    pub const SD: u32 = 0b011;

    /// Branch Equal.
    pub const BEQ: u32 = 0b000;
    /// Branch Not Equal.
    pub const BNE: u32 = 0b001;
    /// Branch Less Than (signed).
    pub const BLT: u32 = 0b100;
    /// Branch Greater or Equal (signed).
    pub const BGE: u32 = 0b101;
    /// Branch Less Than Unsigned.
    pub const BLTU: u32 = 0b110;
    /// Branch Greater or Equal Unsigned.
    pub const BGEU: u32 = 0b111;

    /// Add / Subtract.
    pub const ADD_SUB: u32 = 0b000;
    /// Shift Left Logical.
    pub const SLL: u32 = 0b001;
    /// Set Less Than (signed).
    pub const SLT: u32 = 0b010;
    /// Set Less Than Unsigned.
    pub const SLTU: u32 = 0b011;
    /// Bitwise XOR.
    pub const XOR: u32 = 0b100;
    /// Shift Right Logical / Arithmetic.
    pub const SRL_SRA: u32 = 0b101;
    /// Bitwise OR.
    pub const OR: u32 = 0b110;
    /// Bitwise AND.
    pub const AND: u32 = 0b111;

    /// JALR requires funct3 zero.
    pub const JALR: u32 = 0b000;

    /// Fence.
    pub const FENCE: u32 = 0b000;
    /// Instruction Fence.
    pub const FENCE_I: u32 = 0b001;
}

/// Base integer `funct7` values.
pub mod funct7 {
    /// Default operation (ADD, SRL, etc.).
    pub const DEFAULT: u32 = 0b0000000;
    /// Alternate operation (SUB, SRA).
    pub const ALT: u32 = 0b0100000;
    /// M-extension selector.
    pub const M_EXTENSION: u32 = 0b0000001;
}

/// M-extension `funct3` values (when `funct7 == M_EXTENSION`).
pub mod mfunct3 {
    /// Multiply, low half.
    pub const MUL: u32 = 0b000;
    /// Multiply High (signed * signed).
    pub const MULH: u32 = 0b001;
    /// Multiply High (signed * unsigned).
    pub const MULHSU: u32 = 0b010;
    /// Multiply High (unsigned * unsigned).
    pub const MULHU: u32 = 0b011;
    /// Divide (signed).
    pub const DIV: u32 = 0b100;
    /// Divide Unsigned.
    pub const DIVU: u32 = 0b101;
    /// Remainder (signed).
    pub const REM: u32 = 0b110;
    /// Remainder Unsigned.
    pub const REMU: u32 = 0b111;
}
