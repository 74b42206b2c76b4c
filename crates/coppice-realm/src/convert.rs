//! Mapping from component error types into the closed `CoreErrorKind`
//! taxonomy. Kept as plain functions rather than `From` impls: both the
//! source and target types are foreign to this crate.

use coppice_common::CoreError;
use coppice_delegate::{DelegateError, DelegateId};
use coppice_tree::TreeError;

use crate::error::AuthError;

pub(crate) fn tree_err(e: TreeError) -> CoreError {
    match e {
        TreeError::InvalidPath(msg) => CoreError::invalid_path(msg),
        TreeError::ParentNotFound => CoreError::not_found("parent directory", "<path>"),
        TreeError::NotADirectory(key) => CoreError::not_a_directory(key),
        TreeError::EntryNotFound(path) => CoreError::entry_not_found(path),
        TreeError::NodeMissing(key) => CoreError::not_found("node", key),
        TreeError::Store(source) => CoreError::internal(source),
        TreeError::Codec(source) => CoreError::malformed_node(source),
    }
}

pub(crate) fn delegate_err(e: DelegateError) -> CoreError {
    match e {
        DelegateError::NotFound(id) => CoreError::not_found("delegate", id),
        DelegateError::AlreadyExists(id) => {
            CoreError::internal(DuplicateDelegateId(id))
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("delegate id already exists: {0}")]
struct DuplicateDelegateId(DelegateId);

pub(crate) fn auth_err(e: AuthError) -> CoreError {
    CoreError::unauthorized(e.to_string())
}
