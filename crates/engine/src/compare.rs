//! Expected-versus-actual state comparison.
//!
//! Only the keys declared by the expected state are checked. Registers or bytes that
//! appear only in the actual state are ignored, so a backend that clobbers an
//! undeclared register still passes.

use std::fmt;

use serde::Serialize;

use crate::state::MachineState;

/// Which part of the state disagreed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// A register value.
    Register,
    /// A memory byte.
    Memory,
}

/// Key of a mismatching entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MismatchKey {
    /// Register name.
    Register(String),
    /// Memory address.
    Address(u64),
}

impl fmt::Display for MismatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKey::Register(name) => f.write_str(name),
            MismatchKey::Address(address) => write!(f, "{address:#x}"),
        }
    }
}

/// One disagreement between the expected and actual state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Register or memory.
    pub kind: MismatchKind,
    /// Register name or address.
    pub key: MismatchKey,
    /// Expected value.
    pub expected: u64,
    /// Actual value, or `None` when the actual state lacks the key.
    pub actual: Option<u64>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MismatchKind::Register => "REGISTER",
            MismatchKind::Memory => "MEMORY",
        };
        match self.actual {
            Some(actual) => write!(
                f,
                "{kind} ERROR: {} expected {:#x} got {actual:#x}",
                self.key, self.expected
            ),
            None => write!(
                f,
                "{kind} ERROR: {} expected {:#x} got nothing",
                self.key, self.expected
            ),
        }
    }
}

/// Mask selecting the low `word_size` bytes of a register value.
///
/// Word sizes of 8 or more (and 0, meaning unknown) compare all 64 bits.
pub fn word_mask(word_size: u32) -> u64 {
    match word_size {
        1..=7 => (1u64 << (word_size * 8)) - 1,
        _ => u64::MAX,
    }
}

/// Compares `actual` against every key declared by `expected`.
///
/// Register values are compared after masking to `word_size` bytes. The result lists
/// register mismatches by name, then memory mismatches by address. It is empty when the
/// states agree.
///
/// # Arguments
///
/// * `expected` - State the vector requires.
/// * `actual` - State captured from the backend.
/// * `word_size` - Architecture word size in bytes.
pub fn compare(expected: &MachineState, actual: &MachineState, word_size: u32) -> Vec<Mismatch> {
    let mask = word_mask(word_size);
    let mut mismatches = Vec::new();

    for (name, &want) in &expected.registers {
        let got = actual.register(name);
        if got.map(|value| value & mask) != Some(want & mask) {
            mismatches.push(Mismatch {
                kind: MismatchKind::Register,
                key: MismatchKey::Register(name.clone()),
                expected: want,
                actual: got,
            });
        }
    }

    for (&address, &want) in &expected.memory {
        let got = actual.byte(address);
        if got != Some(want) {
            mismatches.push(Mismatch {
                kind: MismatchKind::Memory,
                key: MismatchKey::Address(address),
                expected: want as u64,
                actual: got.map(u64::from),
            });
        }
    }

    mismatches
}
