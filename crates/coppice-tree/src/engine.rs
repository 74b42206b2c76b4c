//! Path-addressed read and copy-on-write mutation over the directory DAG.
//!
//! Every mutation walks from the root along the path, rewrites the
//! directories on that path, and returns a new root content key. Existing
//! nodes are never mutated in place; a failed mutation leaves the caller
//! holding the unchanged old root (no compare-and-swap happens here — that
//! is the delegate store's job).

use coppice_codec::{ContentKey, DictBuilder, DictNode, Node};
use coppice_store::BlobStore;
use smol_str::SmolStr;

use crate::path::{normalize, resolve_segment};
use crate::TreeError;

/// The tree engine, parameterized over a blob store backend.
#[derive(Debug, Clone)]
pub struct TreeEngine<S> {
    store: S,
}

impl<S: BlobStore> TreeEngine<S> {
    /// Build an engine over the given blob store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying blob store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Walk from `root` matching each path segment. The empty path returns
    /// `root` unchanged. A missing segment yields `None`, never an error.
    pub async fn resolve(&self, root: ContentKey, path: &str) -> Result<Option<ContentKey>, TreeError> {
        let segments = normalize(path)?;
        if segments.is_empty() {
            return Ok(Some(root));
        }
        let mut current = root;
        for seg in &segments {
            let node = self.load_node(current).await?;
            match node {
                Node::Dict(dict) => match resolve_segment(&dict, seg.as_str()) {
                    Some(key) => current = key,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Insert the entry if `path`'s final segment is absent, replace its
    /// child key otherwise. The parent of the final segment must exist and
    /// be a directory.
    pub async fn add_or_replace(
        &self,
        root: ContentKey,
        path: &str,
        child_key: ContentKey,
    ) -> Result<ContentKey, TreeError> {
        let segments = require_nonempty(normalize(path)?)?;
        self.mutate_at(root, &segments, TreeError::ParentNotFound, move |parent, last| {
            Ok(DictBuilder::from(parent).upsert(last.clone(), child_key).build())
        })
        .await
    }

    /// Remove the entry named by the final segment of `path`. The parent
    /// directory may become empty.
    pub async fn remove(&self, root: ContentKey, path: &str) -> Result<ContentKey, TreeError> {
        let segments = require_nonempty(normalize(path)?)?;
        let not_found = TreeError::EntryNotFound(path.to_string());
        let path_for_closure = path.to_string();
        self.mutate_at(root, &segments, not_found, move |parent, last| {
            if parent.get(last.as_str()).is_none() {
                return Err(TreeError::EntryNotFound(path_for_closure));
            }
            Ok(DictBuilder::from(parent).remove(last.as_str()).build())
        })
        .await
    }

    /// Replace the entry at the terminal segment of `path`, which must
    /// already exist (directory or file). Used by branch completion.
    pub async fn replace_subtree(
        &self,
        root: ContentKey,
        path: &str,
        new_child_key: ContentKey,
    ) -> Result<ContentKey, TreeError> {
        let segments = require_nonempty(normalize(path)?)?;
        if self.resolve(root, path).await?.is_none() {
            return Err(TreeError::EntryNotFound(path.to_string()));
        }
        self.mutate_at(
            root,
            &segments,
            TreeError::EntryNotFound(path.to_string()),
            move |parent, last| Ok(DictBuilder::from(parent).upsert(last.clone(), new_child_key).build()),
        )
        .await
    }

    /// `add_or_replace` with the canonical empty directory as the child.
    pub async fn mkdir(&self, root: ContentKey, path: &str) -> Result<ContentKey, TreeError> {
        let encoded = coppice_codec::encode(&coppice_codec::empty_dict()).map_err(TreeError::Codec)?;
        self.store.put(&encoded.key, encoded.bytes).await.map_err(TreeError::Store)?;
        self.add_or_replace(root, path, encoded.key).await
    }

    /// Create every directory segment of `path` that does not already
    /// exist, leaving existing ones untouched. Used to back the wire
    /// protocol's recursive-create operations: callers run this over a
    /// destination's parent directory before `add_or_replace`, so a write
    /// to a nested path on a fresh root does not fail with
    /// [`TreeError::ParentNotFound`].
    pub async fn ensure_dir_path(&self, root: ContentKey, path: &str) -> Result<ContentKey, TreeError> {
        let segments = normalize(path)?;
        if segments.is_empty() {
            return Ok(root);
        }

        let mut stack = Vec::with_capacity(segments.len());
        let mut current_key = root;
        for seg in &segments {
            let dict = self.load_dict(current_key).await?;
            current_key = match dict.get(seg.as_str()) {
                Some(existing) => existing,
                None => {
                    let encoded = coppice_codec::encode(&coppice_codec::empty_dict()).map_err(TreeError::Codec)?;
                    self.store.put(&encoded.key, encoded.bytes).await.map_err(TreeError::Store)?;
                    encoded.key
                }
            };
            stack.push((dict, seg.clone()));
        }

        let mut new_key = current_key;
        for (dict, seg) in stack.into_iter().rev() {
            let updated = DictBuilder::from(dict).upsert(seg, new_key).build();
            new_key = self.encode_and_store(Node::Dict(updated)).await?;
        }
        Ok(new_key)
    }

    /// `ensure_dir_path` over the parent directory of `path`'s final
    /// segment. The empty path and a single-segment path have no parent to
    /// create and return `root` unchanged.
    pub async fn ensure_parent_dir(&self, root: ContentKey, path: &str) -> Result<ContentKey, TreeError> {
        let segments = normalize(path)?;
        let parents = match segments.split_last() {
            Some((_, parents)) => parents,
            None => return Ok(root),
        };
        if parents.is_empty() {
            return Ok(root);
        }
        let parent_path = parents.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("/");
        self.ensure_dir_path(root, &parent_path).await
    }

    /// `resolve(from)`, then `remove(from)`, then `add_or_replace(to, resolved)`.
    pub async fn move_entry(&self, root: ContentKey, from: &str, to: &str) -> Result<ContentKey, TreeError> {
        let resolved = self
            .resolve(root, from)
            .await?
            .ok_or_else(|| TreeError::EntryNotFound(from.to_string()))?;
        let after_remove = self.remove(root, from).await?;
        self.add_or_replace(after_remove, to, resolved).await
    }

    /// `add_or_replace(to, resolve(from))`, without removing the source.
    pub async fn copy_entry(&self, root: ContentKey, from: &str, to: &str) -> Result<ContentKey, TreeError> {
        let resolved = self
            .resolve(root, from)
            .await?
            .ok_or_else(|| TreeError::EntryNotFound(from.to_string()))?;
        self.add_or_replace(root, to, resolved).await
    }

    async fn load_node(&self, key: ContentKey) -> Result<Node, TreeError> {
        let bytes = self.store.get(&key).await.map_err(TreeError::Store)?;
        let bytes = bytes.ok_or(TreeError::NodeMissing(key))?;
        coppice_codec::decode(&bytes).map_err(TreeError::Codec)
    }

    async fn load_dict(&self, key: ContentKey) -> Result<DictNode, TreeError> {
        match self.load_node(key).await? {
            Node::Dict(d) => Ok(d),
            _ => Err(TreeError::NotADirectory(key.to_string())),
        }
    }

    async fn encode_and_store(&self, node: Node) -> Result<ContentKey, TreeError> {
        let encoded = coppice_codec::encode(&node).map_err(TreeError::Codec)?;
        self.store.put(&encoded.key, encoded.bytes).await.map_err(TreeError::Store)?;
        Ok(encoded.key)
    }

    /// Shared copy-on-write walk used by `add_or_replace`, `remove`, and
    /// `replace_subtree`: descend to the parent of the final segment,
    /// apply `mutate_parent`, then re-encode every ancestor on the way
    /// back up. Returns the new root key.
    async fn mutate_at(
        &self,
        root: ContentKey,
        segments: &[SmolStr],
        missing_ancestor: TreeError,
        mutate_parent: impl FnOnce(DictNode, &SmolStr) -> Result<DictNode, TreeError>,
    ) -> Result<ContentKey, TreeError> {
        let (last, parents) = segments.split_last().expect("segments checked non-empty");

        let mut stack = Vec::with_capacity(parents.len());
        let mut current_key = root;
        for seg in parents {
            let dict = self
                .load_dict(current_key)
                .await
                .map_err(|e| e.missing_as(clone_tree_error(&missing_ancestor)))?;
            let next = dict
                .get(seg.as_str())
                .ok_or_else(|| clone_tree_error(&missing_ancestor))?;
            stack.push((dict, seg.clone()));
            current_key = next;
        }

        let parent_dict = self
            .load_dict(current_key)
            .await
            .map_err(|e| e.missing_as(clone_tree_error(&missing_ancestor)))?;
        let new_parent = mutate_parent(parent_dict, last)?;
        let mut new_key = self.encode_and_store(Node::Dict(new_parent)).await?;

        for (dict, seg) in stack.into_iter().rev() {
            let updated = DictBuilder::from(dict).upsert(seg, new_key).build();
            new_key = self.encode_and_store(Node::Dict(updated)).await?;
        }

        Ok(new_key)
    }
}

fn require_nonempty(segments: Vec<SmolStr>) -> Result<Vec<SmolStr>, TreeError> {
    if segments.is_empty() {
        return Err(TreeError::InvalidPath("must not be empty".into()));
    }
    Ok(segments)
}

fn clone_tree_error(e: &TreeError) -> TreeError {
    match e {
        TreeError::InvalidPath(s) => TreeError::InvalidPath(s.clone()),
        TreeError::ParentNotFound => TreeError::ParentNotFound,
        TreeError::NotADirectory(s) => TreeError::NotADirectory(s.clone()),
        TreeError::EntryNotFound(s) => TreeError::EntryNotFound(s.clone()),
        TreeError::NodeMissing(k) => TreeError::NodeMissing(*k),
        TreeError::Store(_) | TreeError::Codec(_) => {
            TreeError::EntryNotFound("ancestor unreadable".into())
        }
    }
}
