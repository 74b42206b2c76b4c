//! The [`DelegateStore`] trait and its in-memory reference implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use coppice_codec::ContentKey;

use crate::delegate::{AccessMode, Delegate, Lifetime};
use crate::error::DelegateError;
use crate::id::{DelegateId, TokenFingerprint};

/// Persistence for capability records and their current root pointers.
///
/// A realm's delegates form an in-memory tree via `parent_id`, rooted at
/// the unique delegate with `parent_id == None`.
#[trait_variant::make(Send)]
pub trait DelegateStore: Clone {
    /// Insert a new delegate record. Fails if the id is already present.
    async fn insert_delegate(&self, delegate: Delegate) -> Result<(), DelegateError>;

    /// Fetch a delegate by id.
    async fn get_delegate(&self, id: &DelegateId) -> Result<Option<Delegate>, DelegateError>;

    /// Remove a delegate and its root pointer outright.
    async fn remove_delegate(&self, id: &DelegateId) -> Result<(), DelegateError>;

    /// All delegates (root and branches) belonging to a realm.
    async fn list_delegates(&self, realm_id: &str) -> Result<Vec<Delegate>, DelegateError>;

    /// The delegate's current root, if one has been set.
    async fn get_root(&self, id: &DelegateId) -> Result<Option<ContentKey>, DelegateError>;

    /// Overwrite the delegate's current root.
    async fn set_root(&self, id: &DelegateId, key: ContentKey) -> Result<(), DelegateError>;

    /// Mark a delegate closed. Irreversible.
    async fn set_closed(&self, id: &DelegateId) -> Result<(), DelegateError>;

    /// Replace an unlimited-lifetime delegate's rolling access expiry.
    /// A no-op on limited-lifetime delegates (their expiry is fixed at
    /// creation).
    async fn touch_access_expiry(
        &self,
        id: &DelegateId,
        new_expiry: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DelegateError>;

    /// Fetch the realm's root delegate, creating it if this is the
    /// realm's first access. Idempotent.
    async fn get_or_create_root_delegate(&self, realm_id: &str) -> Result<Delegate, DelegateError>;
}

#[derive(Debug, Clone)]
struct StoredDelegate {
    delegate: Delegate,
    current_root: Option<ContentKey>,
}

#[derive(Debug, Default)]
struct Inner {
    delegates: BTreeMap<DelegateId, StoredDelegate>,
    root_by_realm: BTreeMap<String, DelegateId>,
}

/// In-memory [`DelegateStore`], backed by a `BTreeMap` guarded by an
/// `RwLock` — the same sharing pattern `coppice_store::MemoryBlobStore`
/// uses for blob bodies.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDelegateStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryDelegateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelegateStore for InMemoryDelegateStore {
    async fn insert_delegate(&self, delegate: Delegate) -> Result<(), DelegateError> {
        let mut inner = self.inner.write().unwrap();
        if inner.delegates.contains_key(&delegate.id) {
            return Err(DelegateError::AlreadyExists(delegate.id));
        }
        if delegate.is_root() {
            inner.root_by_realm.insert(delegate.realm_id.clone(), delegate.id.clone());
        }
        tracing::debug!(delegate_id = %delegate.id, realm_id = %delegate.realm_id, "inserted delegate");
        inner.delegates.insert(
            delegate.id.clone(),
            StoredDelegate {
                delegate,
                current_root: None,
            },
        );
        Ok(())
    }

    async fn get_delegate(&self, id: &DelegateId) -> Result<Option<Delegate>, DelegateError> {
        tracing::trace!(delegate_id = %id, "get_delegate");
        Ok(self.inner.read().unwrap().delegates.get(id).map(|s| s.delegate.clone()))
    }

    async fn remove_delegate(&self, id: &DelegateId) -> Result<(), DelegateError> {
        let mut inner = self.inner.write().unwrap();
        if let Some(stored) = inner.delegates.remove(id) {
            if stored.delegate.is_root() {
                inner.root_by_realm.remove(&stored.delegate.realm_id);
            }
        }
        tracing::debug!(delegate_id = %id, "removed delegate");
        Ok(())
    }

    async fn list_delegates(&self, realm_id: &str) -> Result<Vec<Delegate>, DelegateError> {
        tracing::trace!(realm_id, "list_delegates");
        Ok(self
            .inner
            .read()
            .unwrap()
            .delegates
            .values()
            .filter(|s| s.delegate.realm_id == realm_id)
            .map(|s| s.delegate.clone())
            .collect())
    }

    async fn get_root(&self, id: &DelegateId) -> Result<Option<ContentKey>, DelegateError> {
        tracing::trace!(delegate_id = %id, "get_root");
        let inner = self.inner.read().unwrap();
        let stored = inner.delegates.get(id).ok_or_else(|| DelegateError::NotFound(id.clone()))?;
        Ok(stored.current_root)
    }

    async fn set_root(&self, id: &DelegateId, key: ContentKey) -> Result<(), DelegateError> {
        tracing::debug!(delegate_id = %id, root = %key, "set_root");
        let mut inner = self.inner.write().unwrap();
        let stored = inner
            .delegates
            .get_mut(id)
            .ok_or_else(|| DelegateError::NotFound(id.clone()))?;
        stored.current_root = Some(key);
        Ok(())
    }

    async fn set_closed(&self, id: &DelegateId) -> Result<(), DelegateError> {
        tracing::debug!(delegate_id = %id, "set_closed");
        let mut inner = self.inner.write().unwrap();
        let stored = inner
            .delegates
            .get_mut(id)
            .ok_or_else(|| DelegateError::NotFound(id.clone()))?;
        stored.delegate.closed = true;
        Ok(())
    }

    async fn touch_access_expiry(
        &self,
        id: &DelegateId,
        new_expiry: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DelegateError> {
        let mut inner = self.inner.write().unwrap();
        let stored = inner
            .delegates
            .get_mut(id)
            .ok_or_else(|| DelegateError::NotFound(id.clone()))?;
        if let Lifetime::Unlimited { access_expiry } = &mut stored.delegate.lifetime {
            *access_expiry = new_expiry;
        }
        Ok(())
    }

    async fn get_or_create_root_delegate(&self, realm_id: &str) -> Result<Delegate, DelegateError> {
        {
            let inner = self.inner.read().unwrap();
            if let Some(id) = inner.root_by_realm.get(realm_id) {
                return Ok(inner.delegates[id].delegate.clone());
            }
        }
        let delegate = Delegate {
            id: DelegateId::generate(),
            realm_id: realm_id.to_string(),
            parent_id: None,
            mount_path: String::new(),
            token_fingerprint: TokenFingerprint::of(realm_id.as_bytes()),
            lifetime: Lifetime::Unlimited {
                access_expiry: chrono::DateTime::<chrono::Utc>::MAX_UTC,
            },
            closed: false,
            permissions: Vec::new(),
            access_mode: AccessMode::ReadWrite,
        };
        // Re-check under the write lock: two concurrent first-accesses
        // must not both win and insert a root delegate.
        let mut inner = self.inner.write().unwrap();
        if let Some(id) = inner.root_by_realm.get(realm_id) {
            return Ok(inner.delegates[id].delegate.clone());
        }
        tracing::debug!(realm_id, delegate_id = %delegate.id, "created root delegate");
        inner.root_by_realm.insert(realm_id.to_string(), delegate.id.clone());
        let out = delegate.clone();
        inner.delegates.insert(
            delegate.id.clone(),
            StoredDelegate {
                delegate,
                current_root: None,
            },
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::Permission;

    fn branch(realm: &str, parent: &DelegateId, mount: &str) -> Delegate {
        Delegate {
            id: DelegateId::generate(),
            realm_id: realm.to_string(),
            parent_id: Some(parent.clone()),
            mount_path: mount.to_string(),
            token_fingerprint: TokenFingerprint::of(b"token"),
            lifetime: Lifetime::Limited {
                expiry: chrono::DateTime::<chrono::Utc>::MAX_UTC,
            },
            closed: false,
            permissions: vec![Permission::FileWrite],
            access_mode: AccessMode::ReadWrite,
        }
    }

    #[tokio::test]
    async fn get_or_create_root_delegate_is_idempotent() {
        let store = InMemoryDelegateStore::new();
        let a = store.get_or_create_root_delegate("r1").await.unwrap();
        let b = store.get_or_create_root_delegate("r1").await.unwrap();
        assert_eq!(a.id, b.id);
        assert!(a.is_root());
    }

    #[tokio::test]
    async fn distinct_realms_get_distinct_root_delegates() {
        let store = InMemoryDelegateStore::new();
        let a = store.get_or_create_root_delegate("r1").await.unwrap();
        let b = store.get_or_create_root_delegate("r2").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn set_root_then_get_root_round_trips() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        assert_eq!(store.get_root(&root.id).await.unwrap(), None);
        let key = ContentKey::of(b"tree-bytes");
        store.set_root(&root.id, key).await.unwrap();
        assert_eq!(store.get_root(&root.id).await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn remove_delegate_clears_root_pointer() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        store.set_root(&root.id, ContentKey::of(b"x")).await.unwrap();
        store.remove_delegate(&root.id).await.unwrap();
        assert!(store.get_delegate(&root.id).await.unwrap().is_none());
        assert!(store.get_root(&root.id).await.is_err());
    }

    #[tokio::test]
    async fn list_delegates_includes_root_and_branches() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        let b = branch("r1", &root.id, "a");
        store.insert_delegate(b.clone()).await.unwrap();
        let all = store.list_delegates("r1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|d| d.id == root.id));
        assert!(all.iter().any(|d| d.id == b.id));
    }

    #[tokio::test]
    async fn set_closed_is_irreversible_marker() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        let b = branch("r1", &root.id, "a");
        store.insert_delegate(b.clone()).await.unwrap();
        store.set_closed(&b.id).await.unwrap();
        let fetched = store.get_delegate(&b.id).await.unwrap().unwrap();
        assert!(fetched.closed);
    }

    #[tokio::test]
    async fn touch_access_expiry_extends_unlimited_lifetime_only() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        let later = chrono::Utc::now() + chrono::Duration::hours(1);
        store.touch_access_expiry(&root.id, later).await.unwrap();
        let fetched = store.get_delegate(&root.id).await.unwrap().unwrap();
        assert!(matches!(fetched.lifetime, Lifetime::Unlimited { access_expiry } if access_expiry == later));
    }

    #[tokio::test]
    async fn insert_duplicate_id_fails() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("r1").await.unwrap();
        let mut b = branch("r1", &root.id, "a");
        b.id = root.id.clone();
        assert!(matches!(
            store.insert_delegate(b).await,
            Err(DelegateError::AlreadyExists(_))
        ));
    }
}
