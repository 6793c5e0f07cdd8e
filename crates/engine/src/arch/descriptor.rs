//! Immutable architecture descriptor arena.
//!
//! The descriptor is parsed exactly once per run. The XML document is walked once and
//! copied into a flat arena of owned elements addressed by `NodeId`, so the result has
//! no borrowed input, is `Send + Sync`, and can be shared by reference across every
//! worker. Nothing in this type can be mutated after construction; per-task decode
//! contexts borrow it and keep their own mutable buffers.

use std::fs;
use std::path::Path;

use crate::arch::probe::{ArchInfo, probe};
use crate::common::LoadError;

/// Index of an element in the descriptor arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One XML element, owned by the arena.
#[derive(Clone, Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<NodeId>,
}

/// Parsed architecture descriptor plus its probed metadata.
#[derive(Debug)]
pub struct ArchitectureDescriptor {
    nodes: Vec<Element>,
    root: NodeId,
    info: ArchInfo,
}

impl ArchitectureDescriptor {
    /// Reads, parses, and probes a descriptor file.
    ///
    /// # Errors
    ///
    /// `LoadError::Io` if the file cannot be read, or any error from [`Self::parse`].
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = Self::parse(&text)?;
        tracing::info!(
            elements = descriptor.nodes.len(),
            word_size = descriptor.info.word_size,
            default_space = %descriptor.info.default_space,
            "loaded architecture descriptor"
        );
        Ok(descriptor)
    }

    /// Parses descriptor XML into the arena and runs the metadata probe.
    ///
    /// # Errors
    ///
    /// `LoadError::Xml` for malformed XML, otherwise any error from [`probe`].
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let document = roxmltree::Document::parse(text)?;

        let mut nodes = Vec::new();
        let root = copy_element(document.root_element(), &mut nodes);

        let mut descriptor = Self {
            nodes,
            root,
            info: ArchInfo::default(),
        };
        descriptor.info = probe(&descriptor)?;
        Ok(descriptor)
    }

    /// Root element.
    pub fn root(&self) -> ElementRef<'_> {
        ElementRef {
            tree: self,
            id: self.root,
        }
    }

    /// Metadata extracted by the probe.
    pub fn info(&self) -> &ArchInfo {
        &self.info
    }

    /// Byte width of the default address space.
    pub fn word_size(&self) -> u32 {
        self.info.word_size
    }

    /// Total number of elements in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no element. Never true for a parsed descriptor.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.index()]
    }
}

/// Copies an element subtree into the arena, depth first, and returns its id.
fn copy_element(node: roxmltree::Node<'_, '_>, nodes: &mut Vec<Element>) -> NodeId {
    let id = NodeId(nodes.len() as u32);
    nodes.push(Element {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        children: Vec::new(),
    });

    let children: Vec<NodeId> = node
        .children()
        .filter(roxmltree::Node::is_element)
        .map(|child| copy_element(child, nodes))
        .collect();
    nodes[id.index()].children = children;

    id
}

/// Read-only view of one element in a descriptor.
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'d> {
    tree: &'d ArchitectureDescriptor,
    id: NodeId,
}

impl<'d> ElementRef<'d> {
    /// Arena id of this element.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tag name.
    pub fn name(&self) -> &'d str {
        &self.tree.element(self.id).name
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&'d str> {
        self.tree
            .element(self.id)
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order.
    pub fn children(self) -> impl Iterator<Item = ElementRef<'d>> + 'd {
        let tree = self.tree;
        tree.element(self.id)
            .children
            .iter()
            .map(move |&id| ElementRef { tree, id })
    }

    /// First child element with the given tag name.
    pub fn child(self, name: &str) -> Option<ElementRef<'d>> {
        self.children().find(|child| child.name() == name)
    }
}
