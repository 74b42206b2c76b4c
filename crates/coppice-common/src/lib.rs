//! Shared error taxonomy and configuration surface for the coppice core.
//!
//! Every component crate (`coppice-codec`, `coppice-store`, `coppice-tree`,
//! `coppice-delegate`, `coppice-realm`) owns a narrow error type of its own;
//! this crate defines the closed [`CoreErrorKind`] taxonomy that
//! `coppice-realm` maps all of them into at the service boundary, per the
//! error handling design.

mod config;
mod error;

pub use config::{Config, StorageKind};
pub use error::{BoxError, CoreError, CoreErrorKind, Result};
