//! Delegate store errors.

use crate::DelegateId;

/// Errors the delegate store can surface.
#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    /// No delegate exists with the given id.
    #[error("delegate not found: {0}")]
    NotFound(DelegateId),

    /// A delegate with this id was already inserted.
    #[error("delegate already exists: {0}")]
    AlreadyExists(DelegateId),
}
