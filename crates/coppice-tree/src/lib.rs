//! The tree engine: path resolution and copy-on-write mutation over the
//! content-addressed directory DAG described by `coppice-codec`.
//!
//! This crate knows nothing about realms, branches, or capabilities — it
//! operates purely on root content keys and paths, against any
//! [`coppice_store::BlobStore`].

mod engine;
mod error;
mod path;

pub use engine::TreeEngine;
pub use error::TreeError;
pub use path::{normalize, resolve_segment};
