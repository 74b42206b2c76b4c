//! Front-facing orchestrator crate: bearer-credential authentication,
//! capability checks, and the realm/branch lifecycle built atop
//! `coppice-tree` and `coppice-delegate`.

mod auth;
mod caller;
mod convert;
mod credential;
mod error;
mod service;

pub use auth::worker_bearer_token;
pub use caller::Caller;
pub use credential::{DottedClaims, RawCredential, decode_credential};
pub use error::AuthError;
pub use service::{BranchCreated, RealmService};
