//! # ALU Tests
//!
//! Width handling at the edges: RV32 results keep only the low word, `*W` results
//! are sign-extended, and division follows the RISC-V corner-case rules.

use pretty_assertions::assert_eq;
use rstest::rstest;
use stepcheck_core::stepper::riscv::Xlen;
use stepcheck_core::stepper::riscv::alu::{AluOp, Width, execute};

#[rstest]
#[case::rv32_add_wraps(AluOp::Add, 0xFFFF_FFFF, 1, Width::Rv32, 0)]
#[case::word_add_sign_extends(AluOp::Add, 0x7FFF_FFFF, 1, Width::Word, 0xFFFF_FFFF_8000_0000)]
#[case::rv32_sub_clears_upper(AluOp::Sub, 0, 1, Width::Rv32, 0xFFFF_FFFF)]
#[case::rv64_shift_masks_amount(AluOp::Sll, 1, 65, Width::Rv64, 2)]
#[case::rv32_shift_masks_amount(AluOp::Sll, 1, 33, Width::Rv32, 2)]
#[case::rv32_srl_is_logical(AluOp::Srl, 0x8000_0000, 4, Width::Rv32, 0x0800_0000)]
#[case::rv32_sra_is_arithmetic(AluOp::Sra, 0x8000_0000, 4, Width::Rv32, 0xF800_0000)]
#[case::srlw_by_zero_sign_extends(AluOp::Srl, 0x8000_0000, 0, Width::Word, 0xFFFF_FFFF_8000_0000)]
#[case::rv32_slt_is_signed(AluOp::Slt, 0xFFFF_FFFF, 0, Width::Rv32, 1)]
#[case::rv32_sltu_is_unsigned(AluOp::Sltu, 0xFFFF_FFFF, 0, Width::Rv32, 0)]
fn base_operations(
    #[case] op: AluOp,
    #[case] a: u64,
    #[case] b: u64,
    #[case] width: Width,
    #[case] expected: u64,
) {
    assert_eq!(execute(op, a, b, width), expected);
}

#[rstest]
#[case::rv32_mulh_of_min(AluOp::Mulh, 0x8000_0000, 0x8000_0000, Width::Rv32, 0x4000_0000)]
#[case::rv32_mulh_small(AluOp::Mulh, 0xFFFF_FFFF, 0xFFFF_FFFF, Width::Rv32, 0)]
#[case::rv64_mulhu_max(AluOp::Mulhu, u64::MAX, u64::MAX, Width::Rv64, 0xFFFF_FFFF_FFFF_FFFE)]
#[case::rv64_mulhsu_negative(AluOp::Mulhsu, u64::MAX, u64::MAX, Width::Rv64, u64::MAX)]
#[case::rv32_div_overflow(AluOp::Div, 0x8000_0000, 0xFFFF_FFFF, Width::Rv32, 0x8000_0000)]
#[case::rv32_rem_overflow(AluOp::Rem, 0x8000_0000, 0xFFFF_FFFF, Width::Rv32, 0)]
#[case::rv32_div_by_zero(AluOp::Div, 7, 0, Width::Rv32, 0xFFFF_FFFF)]
#[case::rv64_divu_by_zero(AluOp::Divu, 7, 0, Width::Rv64, u64::MAX)]
#[case::rv64_rem_by_zero(AluOp::Rem, 7, 0, Width::Rv64, 7)]
#[case::remuw_by_zero(AluOp::Remu, 0x8000_0000, 0, Width::Word, 0xFFFF_FFFF_8000_0000)]
fn multiply_and_divide(
    #[case] op: AluOp,
    #[case] a: u64,
    #[case] b: u64,
    #[case] width: Width,
    #[case] expected: u64,
) {
    assert_eq!(execute(op, a, b, width), expected);
}

#[test]
fn width_follows_register_width() {
    assert_eq!(Width::from(Xlen::Rv32), Width::Rv32);
    assert_eq!(Width::from(Xlen::Rv64), Width::Rv64);
    assert_eq!(Width::Word.bits(), 32);
}
