//! Closed error-kind taxonomy for the core.
//!
//! Replaces the source system's convention of inspecting error *messages*
//! to decide transport codes: every failure surfaces as one of the kinds
//! below, and the wire layer (outside this workspace) maps each kind to a
//! transport code exactly once.

use std::error::Error;
use std::fmt;

/// Boxed error type for error sources.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// The closed set of error kinds a conforming core implementation surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorKind {
    /// Path contains `.`, `..`, or was empty where required.
    InvalidPath,
    /// Root pointer absent, node missing, path segment missing, or branch not found.
    NotFound,
    /// Parent on the write path is a file.
    NotADirectory,
    /// Path to remove/move is absent.
    EntryNotFound,
    /// Codec decode failure.
    MalformedNode,
    /// Missing, undecodable, or expired credential.
    Unauthorized,
    /// Authenticated but lacking capability, or realm mismatch.
    Forbidden,
    /// Body failed schema check, mount path didn't resolve, branch already closed.
    BadRequest,
    /// Reserved for branch completion when the branch is already closed.
    Conflict,
    /// Any unexpected failure from an external collaborator.
    Internal,
}

impl fmt::Display for CoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoreErrorKind::InvalidPath => "InvalidPath",
            CoreErrorKind::NotFound => "NotFound",
            CoreErrorKind::NotADirectory => "NotADirectory",
            CoreErrorKind::EntryNotFound => "EntryNotFound",
            CoreErrorKind::MalformedNode => "MalformedNode",
            CoreErrorKind::Unauthorized => "Unauthorized",
            CoreErrorKind::Forbidden => "Forbidden",
            CoreErrorKind::BadRequest => "BadRequest",
            CoreErrorKind::Conflict => "Conflict",
            CoreErrorKind::Internal => "Internal",
        };
        f.write_str(s)
    }
}

/// Core operation error with rich diagnostics.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct CoreError {
    kind: CoreErrorKind,
    #[source]
    source: Option<BoxError>,
    #[help]
    help: Option<String>,
    context: Option<String>,
}

impl CoreError {
    /// Create a new error with the given kind and optional source.
    pub fn new(kind: CoreErrorKind, source: Option<BoxError>) -> Self {
        Self {
            kind,
            source,
            help: None,
            context: None,
        }
    }

    /// Attach a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The error kind.
    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    // Constructors for each kind.

    /// Invalid path error.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::InvalidPath, None).with_context(msg.into())
    }

    /// Not found error.
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::new(CoreErrorKind::NotFound, None)
            .with_context(format!("{resource} not found: {id}"))
    }

    /// Not a directory error.
    pub fn not_a_directory(path: impl fmt::Display) -> Self {
        Self::new(CoreErrorKind::NotADirectory, None)
            .with_context(format!("not a directory: {path}"))
    }

    /// Entry not found error (remove/move source missing).
    pub fn entry_not_found(path: impl fmt::Display) -> Self {
        Self::new(CoreErrorKind::EntryNotFound, None)
            .with_context(format!("entry not found: {path}"))
    }

    /// Malformed node / codec decode failure.
    pub fn malformed_node(source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(CoreErrorKind::MalformedNode, Some(Box::new(source)))
    }

    /// Unauthorized: missing, undecodable, or expired credential.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, None).with_context(msg.into())
    }

    /// Forbidden: authenticated but lacking capability or realm mismatch.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Forbidden, None).with_context(msg.into())
    }

    /// Bad request: schema or precondition violation.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::BadRequest, None).with_context(msg.into())
    }

    /// Conflict: branch already closed, etc.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, None).with_context(msg.into())
    }

    /// Internal: unexpected failure from an external collaborator.
    pub fn internal(source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(CoreErrorKind::Internal, Some(Box::new(source)))
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, ": {ctx}")?;
        }
        if let Some(src) = &self.source {
            write!(f, ": {src}")?;
        }
        Ok(())
    }
}
