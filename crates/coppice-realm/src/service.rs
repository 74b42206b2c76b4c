//! `RealmService`: the front-facing orchestrator.
//!
//! A single struct holding owned handles to the blob store (via the tree
//! engine), the delegate store, and configuration — methods replace the
//! source's closures-over-a-dependency-bag, mirroring
//! `jacquard_repo::Repository<S: BlockStore>`.

use bytes::Bytes;
use chrono::{Duration, Utc};
use coppice_codec::ContentKey;
use coppice_common::{Config, CoreError};
use coppice_delegate::{AccessMode, Delegate, DelegateId, DelegateStore, Lifetime, TokenFingerprint, access_token_for};
use coppice_store::BlobStore;
use coppice_tree::TreeEngine;
use tracing::Instrument;

use crate::auth;
use crate::caller::Caller;
use crate::convert::{auth_err, delegate_err, tree_err};

/// Result of a successful branch creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCreated {
    /// The new branch's delegate id.
    pub branch_id: DelegateId,
    /// The bearer token a worker presents to act as this branch.
    pub access_token: String,
    /// Present only for limited-lifetime branches.
    pub expiry: Option<chrono::DateTime<Utc>>,
}

/// The front-facing orchestrator over a blob store, tree engine, and
/// delegate store.
#[derive(Debug, Clone)]
pub struct RealmService<B, D> {
    tree: TreeEngine<B>,
    delegates: D,
    config: Config,
}

impl<B: BlobStore, D: DelegateStore> RealmService<B, D> {
    /// Build a service over the given blob store, delegate store, and
    /// configuration.
    pub fn new(store: B, delegates: D, config: Config) -> Self {
        Self {
            tree: TreeEngine::new(store),
            delegates,
            config,
        }
    }

    /// Authenticate a bearer credential into a [`Caller`]. Failures log at
    /// `warn` with the credential shape, never the raw token.
    pub async fn authenticate(&self, bearer: &str) -> Result<Caller, CoreError> {
        match auth::authenticate(&self.delegates, bearer, self.config.auth_max_branch_ttl_ms).await {
            Ok(caller) => Ok(caller),
            Err(e) => {
                tracing::warn!(error = %e, "authentication failed");
                Err(auth_err(e))
            }
        }
    }

    /// Enforce that `requested_realm` matches the caller's effective realm,
    /// with `"me"` as a permitted alias for the caller's own realm.
    pub fn check_realm_binding(&self, caller: &Caller, requested_realm: &str) -> Result<(), CoreError> {
        if requested_realm == "me" || requested_realm == caller.realm() {
            Ok(())
        } else {
            Err(CoreError::forbidden(format!(
                "realm {requested_realm} does not match caller's realm {}",
                caller.realm()
            )))
        }
    }

    /// The delegate a caller's operations act through: the realm's root
    /// delegate for a user/long-term-delegate caller, or the branch
    /// delegate itself for a worker.
    async fn effective_delegate(&self, caller: &Caller) -> Result<Delegate, CoreError> {
        match caller {
            Caller::User(_) | Caller::Delegate { .. } => self
                .delegates
                .get_or_create_root_delegate(caller.realm())
                .await
                .map_err(delegate_err),
            Caller::Worker { branch_id, .. } => self
                .delegates
                .get_delegate(branch_id)
                .await
                .map_err(delegate_err)?
                .ok_or_else(|| CoreError::not_found("delegate", branch_id)),
        }
    }

    async fn require_root(&self, delegate: &Delegate) -> Result<ContentKey, CoreError> {
        self.delegates
            .get_root(&delegate.id)
            .await
            .map_err(delegate_err)?
            .ok_or_else(|| CoreError::not_found("root", &delegate.id))
    }

    /// The delegate's current root, lazily seeded with the canonical empty
    /// directory if none has ever been committed. Used by write paths: a
    /// brand-new root delegate or child-of-root branch may receive its
    /// first write before any root exists.
    async fn root_or_seed(&self, delegate: &Delegate) -> Result<ContentKey, CoreError> {
        if let Some(root) = self.delegates.get_root(&delegate.id).await.map_err(delegate_err)? {
            return Ok(root);
        }
        let empty = coppice_codec::encode(&coppice_codec::empty_dict()).map_err(CoreError::malformed_node)?;
        self.tree.store().put(&empty.key, empty.bytes).await.map_err(CoreError::internal)?;
        Ok(empty.key)
    }

    fn check_not_closed(&self, delegate: &Delegate) -> Result<(), CoreError> {
        if delegate.closed {
            Err(CoreError::bad_request("branch is already closed"))
        } else {
            Ok(())
        }
    }

    /// Resolve a path for reading. A missing root is *NotFound*, distinct
    /// from a missing path segment under an existing root, which is
    /// `Ok(None)` per the tree engine's contract.
    pub async fn resolve(&self, caller: &Caller, path: &str) -> Result<Option<ContentKey>, CoreError> {
        if !caller.may_read() {
            return Err(CoreError::forbidden("caller lacks read capability"));
        }
        let span = tracing::debug_span!("realm.resolve", realm = caller.realm(), path);
        async {
            let delegate = self.effective_delegate(caller).await?;
            let root = self.require_root(&delegate).await?;
            self.tree.resolve(root, path).await.map_err(tree_err)
        }
        .instrument(span)
        .await
    }

    /// Write (or overwrite) a file's bytes at `path`.
    pub async fn put_file(
        &self,
        caller: &Caller,
        path: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<ContentKey, CoreError> {
        if data.len() > self.config.limits_max_file_bytes {
            return Err(CoreError::bad_request(format!(
                "file of {} bytes exceeds limit of {} bytes",
                data.len(),
                self.config.limits_max_file_bytes
            )));
        }
        let encoded = coppice_codec::encode_file(data.clone(), content_type, data.len() as u64)
            .map_err(CoreError::malformed_node)?;
        self.mutate(caller, "put_file", |tree, store_root| async move {
            tree.store().put(&encoded.key, encoded.bytes).await.map_err(tree_err_store)?;
            let root_with_parents = tree.ensure_parent_dir(store_root, path).await.map_err(tree_err)?;
            tree.add_or_replace(root_with_parents, path, encoded.key).await.map_err(tree_err)
        })
        .await
    }

    /// Create an empty directory at `path`, recursive-creating any missing
    /// ancestor directories first.
    pub async fn mkdir(&self, caller: &Caller, path: &str) -> Result<ContentKey, CoreError> {
        self.mutate(caller, "mkdir", |tree, root| async move {
            let root_with_parents = tree.ensure_parent_dir(root, path).await.map_err(tree_err)?;
            tree.mkdir(root_with_parents, path).await.map_err(tree_err)
        })
        .await
    }

    /// Remove the entry at `path`.
    pub async fn remove(&self, caller: &Caller, path: &str) -> Result<ContentKey, CoreError> {
        self.mutate(caller, "remove", |tree, root| async move { tree.remove(root, path).await.map_err(tree_err) })
            .await
    }

    /// Move an entry from `from` to `to`, recursive-creating `to`'s
    /// ancestor directories first.
    pub async fn move_entry(&self, caller: &Caller, from: &str, to: &str) -> Result<ContentKey, CoreError> {
        self.mutate(caller, "move", |tree, root| async move {
            let root_with_parents = tree.ensure_parent_dir(root, to).await.map_err(tree_err)?;
            tree.move_entry(root_with_parents, from, to).await.map_err(tree_err)
        })
        .await
    }

    /// Copy an entry from `from` to `to`, recursive-creating `to`'s
    /// ancestor directories first.
    pub async fn copy_entry(&self, caller: &Caller, from: &str, to: &str) -> Result<ContentKey, CoreError> {
        self.mutate(caller, "copy", |tree, root| async move {
            let root_with_parents = tree.ensure_parent_dir(root, to).await.map_err(tree_err)?;
            tree.copy_entry(root_with_parents, from, to).await.map_err(tree_err)
        })
        .await
    }

    /// Shared write-path skeleton: capability check, closed-branch check,
    /// lazy root seed, apply `op`, commit the new root.
    async fn mutate<F, Fut>(&self, caller: &Caller, op_name: &'static str, op: F) -> Result<ContentKey, CoreError>
    where
        F: FnOnce(TreeEngine<B>, ContentKey) -> Fut,
        Fut: std::future::Future<Output = Result<ContentKey, CoreError>>,
    {
        if !caller.may_write() {
            return Err(CoreError::forbidden("caller lacks write capability"));
        }
        let span = tracing::info_span!("realm.mutate", realm = caller.realm(), op = op_name);
        async {
            let delegate = self.effective_delegate(caller).await?;
            self.check_not_closed(&delegate)?;
            let root = self.root_or_seed(&delegate).await?;
            let new_root = op(self.tree.clone(), root).await?;
            self.delegates.set_root(&delegate.id, new_root).await.map_err(delegate_err)?;
            tracing::debug!(delegate_id = %delegate.id, new_root = %new_root, "committed new root");
            Ok(new_root)
        }
        .instrument(span)
        .await
    }

    fn resolve_lifetime(&self, ttl_ms: Option<u64>) -> Lifetime {
        match ttl_ms {
            Some(requested) => {
                let capped = requested.min(self.config.auth_max_branch_ttl_ms);
                Lifetime::Limited {
                    expiry: Utc::now() + Duration::milliseconds(capped as i64),
                }
            }
            None => Lifetime::Unlimited {
                access_expiry: Utc::now() + Duration::milliseconds(self.config.auth_max_branch_ttl_ms as i64),
            },
        }
    }

    /// Create a branch. `parent_branch_id` distinguishes the two cases:
    /// `None` mounts a new branch under the realm root; `Some` mounts a
    /// sub-branch under an existing branch the caller is the worker of.
    pub async fn create_branch(
        &self,
        caller: &Caller,
        mount_path: &str,
        ttl_ms: Option<u64>,
        parent_branch_id: Option<DelegateId>,
    ) -> Result<BranchCreated, CoreError> {
        coppice_tree::normalize(mount_path).map_err(tree_err)?;

        let (realm_id, parent_id, initial_root) = match parent_branch_id {
            None => {
                if !caller.may_manage_branches() {
                    return Err(CoreError::forbidden("caller lacks branch-management capability"));
                }
                let root_delegate = self
                    .delegates
                    .get_or_create_root_delegate(caller.realm())
                    .await
                    .map_err(delegate_err)?;
                (caller.realm().to_string(), root_delegate.id, None)
            }
            Some(parent_id) => {
                let is_parent_worker = matches!(caller, Caller::Worker { branch_id, .. } if *branch_id == parent_id);
                if !is_parent_worker {
                    return Err(CoreError::forbidden("caller is not the worker of the parent branch"));
                }
                let parent = self
                    .delegates
                    .get_delegate(&parent_id)
                    .await
                    .map_err(delegate_err)?
                    .ok_or_else(|| CoreError::not_found("delegate", &parent_id))?;
                let parent_root = self.require_root(&parent).await?;
                let resolved = self
                    .tree
                    .resolve(parent_root, mount_path)
                    .await
                    .map_err(tree_err)?
                    .ok_or_else(|| CoreError::bad_request("mount path did not resolve under parent"))?;
                (parent.realm_id, parent_id, Some(resolved))
            }
        };

        let lifetime = self.resolve_lifetime(ttl_ms);
        let expiry = match &lifetime {
            Lifetime::Limited { expiry } => Some(*expiry),
            Lifetime::Unlimited { .. } => None,
        };

        let branch_id = DelegateId::generate();
        let token = access_token_for(&branch_id);
        let delegate = Delegate {
            id: branch_id.clone(),
            realm_id,
            parent_id: Some(parent_id),
            mount_path: mount_path.to_string(),
            token_fingerprint: TokenFingerprint::of(token.as_bytes()),
            lifetime,
            closed: false,
            permissions: Vec::new(),
            access_mode: AccessMode::ReadWrite,
        };
        self.delegates.insert_delegate(delegate).await.map_err(delegate_err)?;
        if let Some(root) = initial_root {
            self.delegates.set_root(&branch_id, root).await.map_err(delegate_err)?;
        }
        tracing::info!(branch_id = %branch_id, "created branch");

        Ok(BranchCreated {
            branch_id,
            access_token: token,
            expiry,
        })
    }

    /// Splice a branch's current root into its parent at the branch's
    /// mount path, and mark the branch closed.
    pub async fn complete_branch(&self, caller: &Caller, branch_id: &DelegateId) -> Result<(), CoreError> {
        let is_worker = matches!(caller, Caller::Worker { branch_id: b, .. } if b == branch_id);
        if !is_worker {
            return Err(CoreError::forbidden("caller is not the worker of this branch"));
        }

        let branch = self
            .delegates
            .get_delegate(branch_id)
            .await
            .map_err(delegate_err)?
            .ok_or_else(|| CoreError::not_found("delegate", branch_id))?;
        let parent_id = branch
            .parent_id
            .clone()
            .ok_or_else(|| CoreError::bad_request("root branches cannot complete"))?;
        let parent = self
            .delegates
            .get_delegate(&parent_id)
            .await
            .map_err(delegate_err)?
            .ok_or_else(|| CoreError::not_found("delegate", &parent_id))?;

        let branch_root = self.require_root(&branch).await?;
        let parent_root = self.require_root(&parent).await?;

        let span = tracing::info_span!("realm.complete_branch", realm = %parent.realm_id, branch_id = %branch_id);
        async {
            let new_parent_root = self
                .tree
                .replace_subtree(parent_root, &branch.mount_path, branch_root)
                .await
                .map_err(tree_err)?;
            self.delegates.set_root(&parent_id, new_parent_root).await.map_err(delegate_err)?;
            self.delegates.set_closed(branch_id).await.map_err(delegate_err)?;
            tracing::info!("completed branch");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Revoke a branch outright. Subsequent authentications using its
    /// token fail.
    pub async fn revoke_branch(&self, caller: &Caller, branch_id: &DelegateId) -> Result<(), CoreError> {
        if !caller.may_manage_branches() {
            return Err(CoreError::forbidden("caller lacks branch-management capability"));
        }
        let delegate = self
            .delegates
            .get_delegate(branch_id)
            .await
            .map_err(delegate_err)?
            .ok_or_else(|| CoreError::not_found("delegate", branch_id))?;
        if delegate.realm_id != caller.realm() {
            return Err(CoreError::forbidden("branch does not belong to caller's realm"));
        }
        self.delegates.remove_delegate(branch_id).await.map_err(delegate_err)?;
        tracing::info!(branch_id = %branch_id, "revoked branch");
        Ok(())
    }

    /// List all delegates (root and branches) in the caller's realm.
    pub async fn list_branches(&self, caller: &Caller) -> Result<Vec<Delegate>, CoreError> {
        if !caller.may_manage_branches() {
            return Err(CoreError::forbidden("caller lacks branch-management capability"));
        }
        self.delegates.list_delegates(caller.realm()).await.map_err(delegate_err)
    }
}

fn tree_err_store(e: coppice_store::StoreError) -> CoreError {
    CoreError::internal(e)
}
