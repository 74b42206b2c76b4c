//! Blob store errors.

/// Errors a [`crate::BlobStore`] backend can surface.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Requested key was not present in the store.
    #[error("blob not found")]
    NotFound,

    /// Underlying I/O failure (filesystem backend).
    #[error("blob store I/O error")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
