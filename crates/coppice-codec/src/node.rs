//! Typed node values.
//!
//! A [`Node`] is a tagged union of the three variants the wire format
//! supports. Construction of [`DictNode`] is only possible through
//! [`crate::DictBuilder`], which enforces name uniqueness and canonical
//! ordering so that equal directories always encode identically.

use bytes::Bytes;
use smol_str::SmolStr;

use crate::ContentKey;

/// A tagged node value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A file body.
    File(FileNode),
    /// A directory ("dict") of named children.
    Dict(DictNode),
    /// A continuation pointer for file chains. Present in the codec but
    /// unused by the mutation paths in this workspace.
    Successor(SuccessorNode),
}

impl Node {
    /// `true` if this is a [`Node::Dict`].
    pub fn is_dict(&self) -> bool {
        matches!(self, Node::Dict(_))
    }

    /// `true` if this is a [`Node::File`].
    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    /// View as a directory, if this is one.
    pub fn as_dict(&self) -> Option<&DictNode> {
        match self {
            Node::Dict(d) => Some(d),
            _ => None,
        }
    }
}

/// A file body: content type, explicit size, and an inline payload.
///
/// Intended for bodies below a configured cap (see
/// `coppice_common::Config::limits_max_file_bytes`); may carry a successor
/// link when a future large-file extension is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// MIME content type.
    pub content_type: String,
    /// Explicit byte size (redundant with `data.len()` but carried
    /// separately, matching the wire format).
    pub size: u64,
    /// Inline byte payload.
    pub data: Bytes,
    /// Optional successor link for a future chained-file extension.
    pub successor: Option<ContentKey>,
}

/// A directory: two parallel sequences of equal length, child names and
/// child content keys, kept in canonical (locale-insensitive
/// lexicographic) order by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictNode {
    pub(crate) names: Vec<SmolStr>,
    pub(crate) child_keys: Vec<ContentKey>,
}

impl DictNode {
    /// Number of children.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Child names, in canonical order.
    pub fn names(&self) -> &[SmolStr] {
        &self.names
    }

    /// Child content keys, in the same order as [`DictNode::names`].
    pub fn child_keys(&self) -> &[ContentKey] {
        &self.child_keys
    }

    /// Look up a child by exact name.
    pub fn get(&self, name: &str) -> Option<ContentKey> {
        self.names
            .iter()
            .position(|n| n.as_str() == name)
            .map(|i| self.child_keys[i])
    }

    /// Look up the index of a child by exact name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    /// Look up a child by positional index.
    pub fn get_index(&self, index: usize) -> Option<ContentKey> {
        self.child_keys.get(index).copied()
    }

    /// Iterate `(name, key)` pairs in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (&SmolStr, &ContentKey)> {
        self.names.iter().zip(self.child_keys.iter())
    }
}

/// A continuation pointer used by file chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessorNode {
    /// The next node in the chain.
    pub next: ContentKey,
}
