//! Byte-addressed blob storage: the leaf dependency of the core.
//!
//! A [`BlobStore`] is a plain content-addressed key→bytes map. `put` is
//! idempotent for equal bytes; there is no ordering guarantee across
//! distinct keys, and `get` either returns exactly the bytes previously put
//! or fails with [`StoreError::NotFound`].

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FilesystemBlobStore;
pub use memory::MemoryBlobStore;

use bytes::Bytes;
use coppice_codec::ContentKey;

/// Byte-addressed blob storage.
///
/// `Clone` is required so the tree engine and realm service can share
/// storage handles cheaply across mutation calls.
#[trait_variant::make(Send)]
pub trait BlobStore: Clone {
    /// Fetch bytes by key. Returns `None` if absent.
    async fn get(&self, key: &ContentKey) -> Result<Option<Bytes>, StoreError>;

    /// Store bytes under the given key. Idempotent for equal bytes.
    async fn put(&self, key: &ContentKey, data: Bytes) -> Result<(), StoreError>;

    /// Remove a key, if present. Not called by the mutation paths in this
    /// workspace; exposed for the out-of-band reclamation pass.
    async fn del(&self, key: &ContentKey) -> Result<(), StoreError>;

    /// Check existence without fetching the body.
    async fn has(&self, key: &ContentKey) -> Result<bool, StoreError>;
}
