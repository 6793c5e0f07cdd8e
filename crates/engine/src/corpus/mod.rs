//! Test corpus inputs.
//!
//! Everything here runs once, before scheduling, and produces read-only inputs:
//! 1. **Mapping:** Translation of corpus register names to backend register names.
//! 2. **Loader:** Ordered `TestCase` sequence parsed from a JSON corpus file.

/// Corpus file parsing into ordered test cases.
pub mod loader;

/// Register name mapping file parsing.
pub mod mapping;

pub use loader::{CorpusFormat, load_corpus, parse_corpus};
pub use mapping::RegisterMapping;
