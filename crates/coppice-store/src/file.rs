//! Filesystem-backed blob storage: one file per key under a base directory.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use coppice_codec::ContentKey;

use crate::{BlobStore, StoreError};

/// Filesystem blob store, one file per key under `base_path`.
///
/// Primarily useful for single-node deployments and development; a
/// production deployment may prefer a database- or object-store-backed
/// implementation behind the same [`BlobStore`] trait.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    base_path: PathBuf,
}

impl FilesystemBlobStore {
    /// Point at `base_path`, creating it if it doesn't exist yet.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path })
    }

    fn path_for(&self, key: &ContentKey) -> PathBuf {
        self.base_path.join(key.to_printable())
    }

    /// The base directory this store writes under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl BlobStore for FilesystemBlobStore {
    async fn get(&self, key: &ContentKey) -> Result<Option<Bytes>, StoreError> {
        tracing::trace!(%key, "filesystem store get");
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &ContentKey, data: Bytes) -> Result<(), StoreError> {
        tracing::debug!(%key, len = data.len(), "filesystem store put");
        let path = self.path_for(key);
        // Idempotent for equal bytes: a put of an existing key just rewrites
        // the same content, so no existence check is needed before writing.
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &data).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn del(&self, key: &ContentKey) -> Result<(), StoreError> {
        tracing::debug!(%key, "filesystem store del");
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, key: &ContentKey) -> Result<bool, StoreError> {
        tracing::trace!(%key, "filesystem store has");
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn put_then_get_returns_same_bytes() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        let key = ContentKey::of(b"hello");
        store.put(&key, Bytes::from_static(b"hello")).await.unwrap();
        let got = store.get(&key).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        let key = ContentKey::of(b"missing");
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn has_and_del() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        let key = ContentKey::of(b"x");
        store.put(&key, Bytes::from_static(b"x")).await.unwrap();
        assert!(store.has(&key).await.unwrap());
        store.del(&key).await.unwrap();
        assert!(!store.has(&key).await.unwrap());
        // Deleting an already-absent key is not an error.
        store.del(&key).await.unwrap();
    }

    #[tokio::test]
    async fn one_file_per_key() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        let key = ContentKey::of(b"named");
        store.put(&key, Bytes::from_static(b"named")).await.unwrap();
        assert!(dir.path().join(key.to_printable()).is_file());
    }
}
