//! Test corpus loader.
//!
//! A corpus is a JSON array of records in the ProcessorTests layout:
//!
//! ```json
//! [{ "name": "addi x1", "initial": { "pc": 4096, "x1": 0, "ram": [[4096, 147]] },
//!    "final":   { "pc": 4100, "x1": 5, "ram": [[4096, 147]] } }]
//! ```
//!
//! Every key of a state object other than the memory key is a register. Loading is
//! all or nothing: the first malformed record fails the whole corpus.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::common::LoadError;
use crate::common::constants::DEFAULT_MEMORY_KEY;
use crate::corpus::mapping::RegisterMapping;
use crate::state::{MachineState, TestCase};

/// Record key of the initial state object.
const INITIAL_KEY: &str = "initial";

/// Record key of the expected final state object.
const FINAL_KEY: &str = "final";

/// Optional record key holding a human-readable test name.
const NAME_KEY: &str = "name";

/// Corpus layout options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusFormat {
    /// State key holding the `[address, byte]` memory list.
    pub memory_key: String,
}

impl Default for CorpusFormat {
    fn default() -> Self {
        Self {
            memory_key: DEFAULT_MEMORY_KEY.to_string(),
        }
    }
}

/// Loads and parses a corpus file.
///
/// # Arguments
///
/// * `path` - JSON corpus file.
/// * `mapping` - Register name translation applied to every register key.
/// * `format` - Corpus layout options.
///
/// # Errors
///
/// `LoadError::Io` when the file cannot be read, otherwise any error from [`parse_corpus`].
#[tracing::instrument(skip(path, mapping, format), fields(path = %path.display()))]
pub fn load_corpus(
    path: &Path,
    mapping: &RegisterMapping,
    format: &CorpusFormat,
) -> Result<Vec<TestCase>, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cases = parse_corpus(&text, mapping, format)?;
    tracing::info!(cases = cases.len(), "loaded corpus");
    Ok(cases)
}

/// Parses corpus text into test cases in file order.
///
/// # Errors
///
/// `LoadError::Json` for invalid JSON, `LoadError::NotAnArray` when the top level is
/// not an array, and `LoadError::MalformedRecord` for the first record that does not
/// have the expected shape.
pub fn parse_corpus(
    text: &str,
    mapping: &RegisterMapping,
    format: &CorpusFormat,
) -> Result<Vec<TestCase>, LoadError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Array(records) = root else {
        return Err(LoadError::NotAnArray);
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_record(index, record, mapping, format))
        .collect()
}

/// Parses one record into a `TestCase`.
fn parse_record(
    index: usize,
    record: &Value,
    mapping: &RegisterMapping,
    format: &CorpusFormat,
) -> Result<TestCase, LoadError> {
    let malformed = |reason: String| LoadError::MalformedRecord {
        record: index,
        reason,
    };

    let Value::Object(fields) = record else {
        return Err(malformed("record is not an object".to_string()));
    };

    let name = match fields.get(NAME_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(other) => return Err(malformed(format!("`name` must be a string, got {other}"))),
    };

    let initial = state_object(fields, INITIAL_KEY).map_err(&malformed)?;
    let expected = state_object(fields, FINAL_KEY).map_err(&malformed)?;

    Ok(TestCase {
        index,
        name,
        initial: parse_state(initial, mapping, format).map_err(&malformed)?,
        expected: parse_state(expected, mapping, format).map_err(&malformed)?,
    })
}

/// Looks up a required state object in a record.
fn state_object<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, String> {
    match fields.get(key) {
        Some(Value::Object(state)) => Ok(state),
        Some(_) => Err(format!("`{key}` must be an object")),
        None => Err(format!("missing `{key}` state")),
    }
}

/// Parses a state object into a `MachineState`, translating register names.
fn parse_state(
    state: &Map<String, Value>,
    mapping: &RegisterMapping,
    format: &CorpusFormat,
) -> Result<MachineState, String> {
    let mut parsed = MachineState::new();

    for (key, value) in state {
        if *key == format.memory_key {
            parse_memory(key, value, &mut parsed)?;
            continue;
        }

        let register_value = value
            .as_u64()
            .ok_or_else(|| format!("register `{key}` must be an unsigned integer, got {value}"))?;
        parsed.set_register(mapping.resolve(key), register_value);
    }

    Ok(parsed)
}

/// Parses the ordered `[address, byte]` list. Later pairs overwrite earlier ones.
fn parse_memory(key: &str, value: &Value, state: &mut MachineState) -> Result<(), String> {
    let Value::Array(pairs) = value else {
        return Err(format!("`{key}` must be a list of [address, byte] pairs"));
    };

    for (position, pair) in pairs.iter().enumerate() {
        let (address, byte) = match pair.as_array().map(Vec::as_slice) {
            Some([address, byte]) => (address, byte),
            _ => return Err(format!("`{key}[{position}]` must be an [address, byte] pair")),
        };

        let address = address
            .as_u64()
            .ok_or_else(|| format!("`{key}[{position}]` address must be an unsigned integer"))?;
        let byte = byte
            .as_u64()
            .and_then(|b| u8::try_from(b).ok())
            .ok_or_else(|| format!("`{key}[{position}]` value must be a byte (0-255)"))?;

        state.set_memory(address, byte);
    }

    Ok(())
}
