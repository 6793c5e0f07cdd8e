//! # State Comparator Tests
//!
//! Only keys present in the expected state are checked; register values are
//! compared at the architecture's word size.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stepcheck_core::MachineState;
use stepcheck_core::compare::{Mismatch, MismatchKey, MismatchKind, compare, word_mask};

#[test]
fn identical_states_have_no_mismatches() {
    let state = MachineState::new()
        .with_register("pc", 0x1004)
        .with_register("x1", 5)
        .with_memory(0x2000, 0xAB);
    assert!(compare(&state, &state, 4).is_empty());
}

#[test]
fn extra_actual_keys_are_ignored() {
    let expected = MachineState::new().with_register("x1", 5);
    let actual = MachineState::new()
        .with_register("x1", 5)
        .with_register("x2", 99)
        .with_memory(0x10, 1);
    assert!(compare(&expected, &actual, 4).is_empty());
}

#[test]
fn reports_registers_then_memory_in_key_order() {
    let expected = MachineState::new()
        .with_register("x2", 2)
        .with_register("pc", 8)
        .with_memory(0x20, 7)
        .with_memory(0x10, 3);
    let actual = MachineState::new()
        .with_register("x2", 0)
        .with_register("pc", 4)
        .with_memory(0x10, 0);

    let mismatches = compare(&expected, &actual, 4);

    assert_eq!(
        mismatches,
        vec![
            Mismatch {
                kind: MismatchKind::Register,
                key: MismatchKey::Register("pc".to_string()),
                expected: 8,
                actual: Some(4),
            },
            Mismatch {
                kind: MismatchKind::Register,
                key: MismatchKey::Register("x2".to_string()),
                expected: 2,
                actual: Some(0),
            },
            Mismatch {
                kind: MismatchKind::Memory,
                key: MismatchKey::Address(0x10),
                expected: 3,
                actual: Some(0),
            },
            Mismatch {
                kind: MismatchKind::Memory,
                key: MismatchKey::Address(0x20),
                expected: 7,
                actual: None,
            },
        ]
    );
}

#[test]
fn register_values_compare_at_word_size() {
    let expected = MachineState::new().with_register("x1", 0xFFFF_FFFF);
    let actual = MachineState::new().with_register("x1", 0xFFFF_FFFF_FFFF_FFFF);

    assert!(compare(&expected, &actual, 4).is_empty());
    assert_eq!(compare(&expected, &actual, 8).len(), 1);
}

#[test]
fn word_masks() {
    assert_eq!(word_mask(1), 0xFF);
    assert_eq!(word_mask(2), 0xFFFF);
    assert_eq!(word_mask(4), 0xFFFF_FFFF);
    assert_eq!(word_mask(8), u64::MAX);
    assert_eq!(word_mask(0), u64::MAX);
    assert_eq!(word_mask(16), u64::MAX);
}

#[test]
fn mismatch_display() {
    let register = Mismatch {
        kind: MismatchKind::Register,
        key: MismatchKey::Register("x1".to_string()),
        expected: 5,
        actual: Some(0),
    };
    let memory = Mismatch {
        kind: MismatchKind::Memory,
        key: MismatchKey::Address(0x40),
        expected: 1,
        actual: None,
    };

    assert_eq!(register.to_string(), "REGISTER ERROR: x1 expected 0x5 got 0x0");
    assert_eq!(memory.to_string(), "MEMORY ERROR: 0x40 expected 0x1 got nothing");
}

fn arb_state() -> impl Strategy<Value = MachineState> {
    (
        prop::collection::btree_map("[a-z][a-z0-9]{0,3}", any::<u64>(), 0..8),
        prop::collection::btree_map(any::<u64>(), any::<u8>(), 0..16),
    )
        .prop_map(|(registers, memory)| MachineState { registers, memory })
}

proptest! {
    #[test]
    fn a_state_always_matches_itself(state in arb_state(), word_size in 1u32..=8) {
        prop_assert!(compare(&state, &state, word_size).is_empty());
    }

    #[test]
    fn comparing_against_empty_reports_every_expected_key(state in arb_state()) {
        let mismatches = compare(&state, &MachineState::new(), 8);
        prop_assert_eq!(mismatches.len(), state.registers.len() + state.memory.len());
        prop_assert!(mismatches.iter().all(|m| m.actual.is_none()));
    }

    #[test]
    fn empty_expectation_always_passes(state in arb_state()) {
        prop_assert!(compare(&MachineState::new(), &state, 8).is_empty());
    }
}
