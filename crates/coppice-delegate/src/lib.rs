//! Persistent capability records (root delegates and branches) and their
//! current root pointers.
//!
//! This crate knows nothing about authentication or the wire protocol; it
//! is a typed, async key-value layer that `coppice-realm` builds on.

mod delegate;
mod error;
mod id;
mod store;

pub use delegate::{AccessMode, Delegate, Lifetime, Permission};
pub use error::DelegateError;
pub use id::{DelegateId, TokenFingerprint, access_token_for, decode_branch_token};
pub use store::{DelegateStore, InMemoryDelegateStore};
