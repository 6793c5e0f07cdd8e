//! Integer ALU for the stepper.
//!
//! Every operation runs at a `Width`. Operands are first narrowed to that width
//! (sign- or zero-extended as the operation needs), the operation runs on 64- or
//! 128-bit values, and the result is brought back to register form by the width:
//! RV64 keeps all 64 bits, RV32 keeps the low 32 with the upper half cleared, and the
//! RV64 `*W` forms sign-extend bit 31.

use super::Xlen;

/// Width an ALU operation runs at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// Full RV32 register.
    Rv32,
    /// Full RV64 register.
    Rv64,
    /// RV64 `*W` form: 32-bit operation, result sign-extended to 64 bits.
    Word,
}

impl From<Xlen> for Width {
    fn from(xlen: Xlen) -> Self {
        match xlen {
            Xlen::Rv32 => Width::Rv32,
            Xlen::Rv64 => Width::Rv64,
        }
    }
}

impl Width {
    /// Operand width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Width::Rv64 => 64,
            Width::Rv32 | Width::Word => 32,
        }
    }

    /// Shift amounts use only the low `log2(bits)` bits of the operand.
    const fn shamt(self, b: u64) -> u32 {
        (b as u32) & (self.bits() - 1)
    }

    /// Operand read as a signed value of this width.
    const fn signed(self, v: u64) -> i64 {
        match self {
            Width::Rv64 => v as i64,
            Width::Rv32 | Width::Word => v as i32 as i64,
        }
    }

    /// Operand read as an unsigned value of this width.
    const fn unsigned(self, v: u64) -> u64 {
        match self {
            Width::Rv64 => v,
            Width::Rv32 | Width::Word => v as u32 as u64,
        }
    }

    /// Brings a raw 64-bit result back to register form.
    const fn finish(self, raw: u64) -> u64 {
        match self {
            Width::Rv64 => raw,
            Width::Rv32 => raw as u32 as u64,
            Width::Word => raw as i32 as i64 as u64,
        }
    }
}

/// Integer ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set less than (signed).
    Slt,
    /// Set less than (unsigned).
    Sltu,
    /// Bitwise XOR.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise OR.
    Or,
    /// Bitwise AND.
    And,
    /// Multiply, low half.
    Mul,
    /// Multiply high, signed by signed.
    Mulh,
    /// Multiply high, signed by unsigned.
    Mulhsu,
    /// Multiply high, unsigned by unsigned.
    Mulhu,
    /// Divide, signed.
    Div,
    /// Divide, unsigned.
    Divu,
    /// Remainder, signed.
    Rem,
    /// Remainder, unsigned.
    Remu,
}

/// Executes an integer ALU operation.
///
/// # Arguments
///
/// * `op`    - The operation.
/// * `a`     - First operand.
/// * `b`     - Second operand (also the shift amount).
/// * `width` - Width the operation runs at.
///
/// # Returns
///
/// The result in register form for `width`. Division by zero yields all ones for
/// quotients and the dividend for remainders; signed overflow wraps.
pub fn execute(op: AluOp, a: u64, b: u64, width: Width) -> u64 {
    let (sa, sb) = (width.signed(a), width.signed(b));
    let (ua, ub) = (width.unsigned(a), width.unsigned(b));
    let high = width.bits();

    let raw = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a.wrapping_shl(width.shamt(b)),
        AluOp::Srl => ua >> width.shamt(b),
        AluOp::Sra => (sa >> width.shamt(b)) as u64,
        AluOp::Slt => u64::from(sa < sb),
        AluOp::Sltu => u64::from(ua < ub),
        AluOp::Xor => a ^ b,
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i128::from(sa) * i128::from(sb)) >> high) as u64,
        AluOp::Mulhsu => ((i128::from(sa) * i128::from(ub)) >> high) as u64,
        AluOp::Mulhu => ((u128::from(ua) * u128::from(ub)) >> high) as u64,
        AluOp::Div if sb == 0 => u64::MAX,
        AluOp::Div => sa.wrapping_div(sb) as u64,
        AluOp::Divu if ub == 0 => u64::MAX,
        AluOp::Divu => ua / ub,
        AluOp::Rem if sb == 0 => sa as u64,
        AluOp::Rem => sa.wrapping_rem(sb) as u64,
        AluOp::Remu if ub == 0 => ua,
        AluOp::Remu => ua % ub,
    };

    width.finish(raw)
}
