//! Configuration options recognized by the core (spec §6).
//!
//! The core never reads environment variables or files directly; an
//! external collaborator (the HTTP/admin layer) is responsible for
//! producing a populated [`Config`].

use std::path::PathBuf;

/// Selects the blob-store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-memory backend, for tests and development.
    Memory,
    /// One-file-per-key backend under `storage_base_path`.
    Filesystem,
}

/// Core configuration, deserializable from whatever config format the
/// external collaborator chooses (JSON, YAML, environment mapping, ...).
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Blob-store backend selection.
    pub storage_kind: StorageKind,
    /// Filesystem backend root directory; required when `storage_kind` is `Filesystem`.
    pub storage_base_path: Option<PathBuf>,
    /// Upper bound applied when branch creation supplies a TTL.
    pub auth_max_branch_ttl_ms: u64,
    /// Shared secret consumed only by the token decoder, never by the core itself.
    pub auth_shared_secret: Option<String>,
    /// Refuses file uploads above this size.
    pub limits_max_file_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_kind: StorageKind::Memory,
            storage_base_path: None,
            auth_max_branch_ttl_ms: 60 * 60 * 1000,
            auth_shared_secret: None,
            limits_max_file_bytes: 4 * 1024 * 1024,
        }
    }
}
