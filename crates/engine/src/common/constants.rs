//! Harness-wide constants.

/// Descriptor format version the metadata probe accepts.
///
/// Compiled `.sla` descriptors carry this in the `version` attribute of the
/// root `sleigh` element; any other value means the file was produced by an
/// incompatible toolchain.
pub const SLEIGH_VERSION: u32 = 3;

/// Name of the descriptor root element.
pub const DESCRIPTOR_ROOT: &str = "sleigh";

/// Default failure budget before a run aborts.
pub const DEFAULT_MAX_FAILURES: usize = 10;

/// Default number of worker threads.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default corpus key holding the `[address, byte]` memory list.
pub const DEFAULT_MEMORY_KEY: &str = "ram";

/// Default interval between progress lines, in milliseconds.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1000;
