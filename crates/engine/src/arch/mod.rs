//! Architecture descriptor handling.
//!
//! The descriptor is the only input shared by every task. It provides:
//! 1. **Arena:** An immutable element tree parsed once from the XML descriptor.
//! 2. **Probe:** Format version validation and word size extraction.

/// Immutable descriptor arena and read-only element views.
pub mod descriptor;

/// Architecture metadata probe.
pub mod probe;

pub use descriptor::{ArchitectureDescriptor, ElementRef, NodeId};
pub use probe::{ArchInfo, probe};
