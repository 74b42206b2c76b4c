//! In-memory blob storage.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use coppice_codec::ContentKey;

use crate::{BlobStore, StoreError};

/// In-memory blob store using a `BTreeMap`, for tests and development.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blocks: Arc<RwLock<BTreeMap<ContentKey, Bytes>>>,
}

impl MemoryBlobStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().unwrap().len()
    }

    /// `true` if the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().unwrap().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &ContentKey) -> Result<Option<Bytes>, StoreError> {
        tracing::trace!(%key, "memory store get");
        Ok(self.blocks.read().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &ContentKey, data: Bytes) -> Result<(), StoreError> {
        tracing::debug!(%key, len = data.len(), "memory store put");
        self.blocks.write().unwrap().insert(*key, data);
        Ok(())
    }

    async fn del(&self, key: &ContentKey) -> Result<(), StoreError> {
        tracing::debug!(%key, "memory store del");
        self.blocks.write().unwrap().remove(key);
        Ok(())
    }

    async fn has(&self, key: &ContentKey) -> Result<bool, StoreError> {
        tracing::trace!(%key, "memory store has");
        Ok(self.blocks.read().unwrap().contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_same_bytes() {
        let store = MemoryBlobStore::new();
        let key = ContentKey::of(b"test data");
        store.put(&key, Bytes::from_static(b"test data")).await.unwrap();
        let got = store.get(&key).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"test data"[..]));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = MemoryBlobStore::new();
        let key = ContentKey::of(b"missing");
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn has_reflects_puts_and_dels() {
        let store = MemoryBlobStore::new();
        let key = ContentKey::of(b"x");
        assert!(!store.has(&key).await.unwrap());
        store.put(&key, Bytes::from_static(b"x")).await.unwrap();
        assert!(store.has(&key).await.unwrap());
        store.del(&key).await.unwrap();
        assert!(!store.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn put_is_idempotent_for_equal_bytes() {
        let store = MemoryBlobStore::new();
        let key = ContentKey::of(b"dup");
        store.put(&key, Bytes::from_static(b"dup")).await.unwrap();
        store.put(&key, Bytes::from_static(b"dup")).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clone_shares_storage() {
        let store1 = MemoryBlobStore::new();
        let store2 = store1.clone();
        let key = ContentKey::of(b"shared");
        store1.put(&key, Bytes::from_static(b"shared")).await.unwrap();
        assert!(store2.has(&key).await.unwrap());
    }
}
