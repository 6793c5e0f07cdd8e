//! Architecture metadata probe.
//!
//! Extracts what the harness itself needs from a descriptor, leaving everything else
//! opaque to the stepper:
//!
//! ```xml
//! <sleigh version="3" bigendian="false">
//!   <spaces defaultspace="ram">
//!     <space name="ram" index="1" size="4" ... />
//!   </spaces>
//! </sleigh>
//! ```

use serde::Serialize;

use crate::arch::descriptor::{ArchitectureDescriptor, ElementRef};
use crate::common::LoadError;
use crate::common::constants::{DESCRIPTOR_ROOT, SLEIGH_VERSION};

/// Element listing the address spaces.
const SPACES_ELEMENT: &str = "spaces";

/// Element declaring one address space.
const SPACE_ELEMENT: &str = "space";

/// Metadata the probe extracts from a descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArchInfo {
    /// Declared format version.
    pub version: u32,
    /// Name of the default address space.
    pub default_space: String,
    /// Byte width of the default address space.
    pub word_size: u32,
    /// Whether the architecture is big-endian.
    pub big_endian: bool,
}

/// Validates the descriptor format and extracts the word size.
///
/// # Errors
///
/// * `LoadError::UnexpectedRoot` if the root element is not `sleigh`.
/// * `LoadError::VersionMismatch` if the version is missing or not [`SLEIGH_VERSION`].
/// * `LoadError::MissingDefaultSpace` if `spaces@defaultspace` is absent or empty.
/// * `LoadError::MissingSpaceWidth` if no matching `space` declares a nonzero `size`.
pub fn probe(descriptor: &ArchitectureDescriptor) -> Result<ArchInfo, LoadError> {
    let root = descriptor.root();
    if root.name() != DESCRIPTOR_ROOT {
        return Err(LoadError::UnexpectedRoot {
            found: root.name().to_string(),
            expected: DESCRIPTOR_ROOT,
        });
    }

    let version = numeric_attr(root, "version");
    if version != SLEIGH_VERSION {
        return Err(LoadError::VersionMismatch {
            found: version,
            expected: SLEIGH_VERSION,
        });
    }

    let spaces = root.child(SPACES_ELEMENT);
    let default_space = spaces
        .and_then(|spaces| spaces.attr("defaultspace"))
        .filter(|name| !name.is_empty())
        .ok_or(LoadError::MissingDefaultSpace)?;

    // A space with a zero or missing size is skipped, not fatal: a later
    // declaration of the same name may still carry the width.
    let word_size = spaces
        .into_iter()
        .flat_map(ElementRef::children)
        .filter(|space| space.name() == SPACE_ELEMENT)
        .filter(|space| space.attr("name") == Some(default_space))
        .map(|space| numeric_attr(space, "size"))
        .find(|&size| size != 0)
        .ok_or_else(|| LoadError::MissingSpaceWidth {
            space: default_space.to_string(),
        })?;

    Ok(ArchInfo {
        version,
        default_space: default_space.to_string(),
        word_size,
        big_endian: matches!(root.attr("bigendian"), Some("true" | "1")),
    })
}

/// Reads an unsigned attribute, treating missing or unparsable values as 0.
fn numeric_attr(element: ElementRef<'_>, name: &str) -> u32 {
    element
        .attr(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}
