//! Tree engine errors (spec §4.3, §7): all path errors surface as one of
//! these four kinds.

use coppice_codec::{CodecError, ContentKey};
use coppice_store::StoreError;

/// Errors the tree engine can surface.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Path contains `.`, `..`, or was empty where required.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The parent of the final path segment does not exist.
    #[error("parent not found")]
    ParentNotFound,

    /// A node on the write path is a file, not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The path to remove, move, or splice is absent.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A node referenced by a content key was not present in the blob store.
    #[error("node missing from blob store: {0}")]
    NodeMissing(ContentKey),

    /// Underlying blob store failure.
    #[error("blob store error")]
    Store(#[source] StoreError),

    /// Underlying codec failure.
    #[error("codec error")]
    Codec(#[source] CodecError),
}

impl TreeError {
    /// Replace a [`TreeError::NodeMissing`] with `replacement`; pass
    /// through any other variant unchanged. Used by the walk helpers to
    /// turn "the store doesn't have this node" into the path-shaped error
    /// the caller's operation is documented to raise.
    pub(crate) fn missing_as(self, replacement: TreeError) -> TreeError {
        match self {
            TreeError::NodeMissing(_) => replacement,
            other => other,
        }
    }
}
