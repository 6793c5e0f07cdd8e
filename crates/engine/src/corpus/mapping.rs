//! Register name mapping.
//!
//! Corpora name registers the way their generator does (`A`, `R0`, `EAX`...),
//! which rarely matches the backend's names. A mapping file holds one
//! `testName=targetName` pair per line. Malformed lines are dropped silently;
//! only an entirely empty result is an error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::common::ConfigError;

/// Read-only translation table from corpus register names to backend names.
///
/// Names without an entry pass through unchanged, so the empty mapping is the identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterMapping {
    entries: HashMap<String, String>,
}

impl RegisterMapping {
    /// Creates the identity mapping.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Builds a mapping from an optional mapping file.
    ///
    /// # Arguments
    ///
    /// * `path` - Mapping file, or `None` for the identity mapping.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, and
    /// `ConfigError::EmptyRegisterMap` if it yields no entries.
    #[tracing::instrument(level = "debug")]
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::identity());
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mapping = Self::parse(&text);
        if mapping.is_empty() {
            return Err(ConfigError::EmptyRegisterMap {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(entries = mapping.len(), "loaded register map");
        Ok(mapping)
    }

    /// Parses mapping text, skipping empty, comment (`#`), and malformed lines.
    ///
    /// A line is kept only when it has an `=` that is neither the first nor the
    /// last character. The line is split at the first `=`; a later duplicate of
    /// the same test name replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with('#') || line.starts_with('=') {
                continue;
            }

            let Some((test_name, target_name)) = line.split_once('=') else {
                continue;
            };
            if target_name.is_empty() {
                continue;
            }

            let _ = entries.insert(test_name.to_string(), target_name.to_string());
        }

        Self { entries }
    }

    /// Inserts or replaces one entry.
    pub fn insert(&mut self, test_name: impl Into<String>, target_name: impl Into<String>) {
        let _ = self.entries.insert(test_name.into(), target_name.into());
    }

    /// Translates a corpus register name, passing unmapped names through.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map_or(name, String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true for the identity mapping.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for RegisterMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
