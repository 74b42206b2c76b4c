//! Codec-specific errors.

/// Errors that can occur while encoding or decoding nodes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Decoding failed: bytes did not parse as a valid node.
    #[error("malformed node")]
    Malformed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Serialization of a well-formed node value failed.
    #[error("node serialization failed")]
    Serialization(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A directory builder was given a duplicate child name.
    #[error("duplicate child name: {0}")]
    DuplicateName(String),

    /// A directory builder was given mismatched names/keys lengths.
    #[error("mismatched lengths: {names} names, {keys} keys")]
    LengthMismatch {
        /// Number of names supplied.
        names: usize,
        /// Number of keys supplied.
        keys: usize,
    },
}

impl CodecError {
    pub(crate) fn malformed(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        CodecError::Malformed(Box::new(e))
    }

    pub(crate) fn serialization(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        CodecError::Serialization(Box::new(e))
    }
}
