//! Architectural state and test case data model.
//!
//! A `MachineState` is sparse: only the registers and memory bytes it names are
//! meaningful, everything else is "don't care". A `TestCase` pairs an initial state
//! with the state expected after exactly one instruction.

use std::collections::BTreeMap;

use serde::Serialize;

/// Sparse register and memory snapshot.
///
/// Register values are unsigned and at most 64 bits wide; memory is byte
/// addressed. Ordered maps keep dumps and mismatch lists deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MachineState {
    /// Register name to value.
    pub registers: BTreeMap<String, u64>,
    /// Address to byte.
    pub memory: BTreeMap<u64, u8>,
}

impl MachineState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a register, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - Register name as the backend knows it.
    /// * `value` - Register value.
    pub fn set_register(&mut self, name: impl Into<String>, value: u64) {
        let _ = self.registers.insert(name.into(), value);
    }

    /// Sets a memory byte, replacing any previous value (last write wins).
    pub fn set_memory(&mut self, address: u64, value: u8) {
        let _ = self.memory.insert(address, value);
    }

    /// Builder-style register setter.
    #[must_use]
    pub fn with_register(mut self, name: impl Into<String>, value: u64) -> Self {
        self.set_register(name, value);
        self
    }

    /// Builder-style memory setter.
    #[must_use]
    pub fn with_memory(mut self, address: u64, value: u8) -> Self {
        self.set_memory(address, value);
        self
    }

    /// Returns the value of a register, if present.
    pub fn register(&self, name: &str) -> Option<u64> {
        self.registers.get(name).copied()
    }

    /// Returns the byte at an address, if present.
    pub fn byte(&self, address: u64) -> Option<u8> {
        self.memory.get(&address).copied()
    }

    /// Returns true when the state names no register and no memory byte.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty() && self.memory.is_empty()
    }
}

/// One recorded single-instruction scenario.
///
/// Immutable once loaded. `index` is the record's position in the corpus and
/// tags every result so reports stay attributable when workers interleave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Zero-based position in the corpus file.
    pub index: usize,
    /// Optional record name from the corpus.
    pub name: Option<String>,
    /// State before the instruction executes.
    pub initial: MachineState,
    /// State required after exactly one instruction.
    pub expected: MachineState,
}
