//! Sparse byte-addressed memory owned by one decode context.
//!
//! Holds only the bytes a vector seeds or an instruction stores. Every other address
//! reads as zero. Addresses wrap at the width of the address space.

use std::collections::HashMap;

/// Sparse memory image.
#[derive(Clone, Debug, Default)]
pub struct SparseMemory {
    bytes: HashMap<u64, u8>,
    address_mask: u64,
}

impl SparseMemory {
    /// Creates an empty memory whose addresses wrap at `address_mask`.
    pub fn new(address_mask: u64) -> Self {
        Self {
            bytes: HashMap::new(),
            address_mask,
        }
    }

    /// Reads one byte; unwritten addresses read as zero.
    pub fn read_u8(&self, address: u64) -> u8 {
        self.bytes
            .get(&(address & self.address_mask))
            .copied()
            .unwrap_or(0)
    }

    /// Writes one byte.
    pub fn write_u8(&mut self, address: u64, value: u8) {
        let _ = self.bytes.insert(address & self.address_mask, value);
    }

    /// Reads `len` bytes little-endian starting at `address`, zero-extended.
    pub fn read_le(&self, address: u64, len: usize) -> u64 {
        (0..len).fold(0u64, |acc, offset| {
            let byte = self.read_u8(address.wrapping_add(offset as u64));
            acc | (u64::from(byte) << (8 * offset))
        })
    }

    /// Writes the low `len` bytes of `value` little-endian starting at `address`.
    pub fn write_le(&mut self, address: u64, len: usize, value: u64) {
        for offset in 0..len {
            self.write_u8(address.wrapping_add(offset as u64), (value >> (8 * offset)) as u8);
        }
    }

    /// Number of bytes ever written.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no byte was written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
