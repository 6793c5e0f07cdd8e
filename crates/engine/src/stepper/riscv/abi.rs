//! RISC-V register naming.
//!
//! Resolves the names a corpus may use for architectural registers: `pc`, the
//! numeric `x0`-`x31` form, and the standard ABI aliases. Matching ignores ASCII case.

/// ABI names indexed by register number.
pub const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Register x0 (zero register, always zero).
pub const REG_ZERO: usize = 0;

/// Register x8 (`s0`, also named `fp`).
pub const REG_FP: usize = 8;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// An architectural register the stepper exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    /// Program counter.
    Pc,
    /// General-purpose register by index.
    Gpr(usize),
}

/// Resolves a register name.
///
/// # Returns
///
/// `None` if the name is not a RISC-V integer register.
pub fn resolve(name: &str) -> Option<Register> {
    let lower = name.to_ascii_lowercase();

    if lower == "pc" {
        return Some(Register::Pc);
    }
    if lower == "fp" {
        return Some(Register::Gpr(REG_FP));
    }

    if let Some(index) = lower.strip_prefix('x') {
        // Reject forms like "x01" so every register has a single spelling.
        if index.len() > 1 && index.starts_with('0') {
            return None;
        }
        return index
            .parse::<usize>()
            .ok()
            .filter(|&index| index < GPR_COUNT)
            .map(Register::Gpr);
    }

    ABI_NAMES
        .iter()
        .position(|&abi| abi == lower)
        .map(Register::Gpr)
}
