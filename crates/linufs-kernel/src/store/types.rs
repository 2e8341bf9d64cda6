//! Core node store types.
//!
//! Nodes are addressed by a bounded integer identifier and a
//! `(parent, name)` pair; there are no paths at this layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{DT_DIR, DT_REG, NAME_MAX_LEN};
use crate::store::error::{StoreError, StoreResult};

/// Node identifier.
///
/// `Ino(0)` is the invalid/free sentinel and is never bound to a live node.
#[derive(Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ino(u32);

impl Ino {
    /// The invalid/free sentinel.
    pub const INVALID: Ino = Ino(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Ino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Ino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ino({})", self.0)
    }
}

impl From<u32> for Ino {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Ino> for u32 {
    fn from(ino: Ino) -> u32 {
        ino.0
    }
}

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file with a content buffer.
    File,
    /// Directory.
    Directory,
}

impl NodeKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// The `type` byte used on the admin wire (`DT_REG` / `DT_DIR`).
    pub fn to_wire(self) -> u8 {
        match self {
            NodeKind::File => DT_REG,
            NodeKind::Directory => DT_DIR,
        }
    }

    /// Parse a wire `type` byte.
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            DT_REG => Some(NodeKind::File),
            DT_DIR => Some(NodeKind::Directory),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.pad("file"),
            NodeKind::Directory => f.pad("directory"),
        }
    }
}

/// Snapshot of one filesystem entry.
///
/// Content is never part of a snapshot; it stays with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique while the node is live.
    pub number: Ino,
    /// Containing directory.
    pub parent: Ino,
    /// Entry name, unique among siblings.
    pub name: String,
    /// Entry kind.
    pub kind: NodeKind,
}

/// Check that `name` can name a single entry.
///
/// Non-empty, at most [`NAME_MAX_LEN`] bytes, no `/` or NUL, and not `.`
/// or `..`.
pub(crate) fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(StoreError::NameTooLong);
    }
    Ok(())
}

impl Node {
    pub fn new(number: Ino, parent: Ino, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            number,
            parent,
            name: name.into(),
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Owned batch of node snapshots returned by `list`.
///
/// Each entry is its own copy, so the batch stays valid across later
/// mutations of the store. Release it with [`NodeBatch::release`] (or drop
/// it); the underlying nodes are unaffected either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeBatch {
    directory: Ino,
    nodes: Vec<Node>,
}

impl NodeBatch {
    pub fn new(directory: Ino, nodes: Vec<Node>) -> Self {
        Self { directory, nodes }
    }

    /// Empty batch for a directory.
    pub fn empty(directory: Ino) -> Self {
        Self::new(directory, Vec::new())
    }

    /// Directory this batch was listed from.
    pub fn directory(&self) -> Ino {
        self.directory
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Find an entry by name.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Entry names, in batch order.
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Free the whole batch at once.
    pub fn release(self) {
        trace!(directory = %self.directory, count = self.nodes.len(), "released node batch");
    }
}

impl IntoIterator for NodeBatch {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeBatch {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
