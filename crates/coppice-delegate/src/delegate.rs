//! The delegate record.

use chrono::{DateTime, Utc};

use crate::id::{DelegateId, TokenFingerprint};

/// How long a delegate's access token remains valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifetime {
    /// Branch with an explicit expiry timestamp.
    Limited {
        /// The token is invalid from this instant on.
        expiry: DateTime<Utc>,
    },
    /// Long-lived delegate with a rolling short-lived access expiry,
    /// refreshed on each successful authentication.
    Unlimited {
        /// The token is valid until this instant, extended on use.
        access_expiry: DateTime<Utc>,
    },
}

impl Lifetime {
    /// `true` if, as of `now`, this lifetime has not yet expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Lifetime::Limited { expiry } => now < *expiry,
            Lifetime::Unlimited { access_expiry } => now < *access_expiry,
        }
    }
}

/// Fine-grained capability a long-term delegate can carry. Distinct from
/// the derived `may_read`/`may_write`/`may_manage_branches` predicates,
/// which a [`crate::Delegate`] maps into via these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// May read files and directories.
    FileRead,
    /// May write, move, copy, and remove files and directories.
    FileWrite,
    /// May create, list, revoke, and complete branches.
    BranchManage,
}

/// Whether a branch's worker token may mutate its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Worker may only read.
    ReadOnly,
    /// Worker may read and write.
    ReadWrite,
}

/// A capability record identifying a sub-root of a realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegate {
    /// Opaque, globally-unique id.
    pub id: DelegateId,
    /// The realm this delegate belongs to.
    pub realm_id: String,
    /// The parent delegate, or `None` for a realm's root delegate.
    pub parent_id: Option<DelegateId>,
    /// Path within the parent's tree this delegate owns. Empty for root
    /// delegates.
    pub mount_path: String,
    /// One-way hash of the bearer token's bytes.
    pub token_fingerprint: TokenFingerprint,
    /// Expiry/refresh behavior of the bearer token.
    pub lifetime: Lifetime,
    /// Set by branch completion; once `true`, further mutation via this
    /// delegate is forbidden.
    pub closed: bool,
    /// Fine-grained permissions, consulted when this delegate is matched
    /// as a long-term-delegate credential (shape 1 of authentication).
    /// Unused for branch/worker delegates.
    pub permissions: Vec<Permission>,
    /// Read/write mode, consulted when this delegate is matched as a
    /// branch/worker credential (shape 2). Unused for root and long-term
    /// delegates.
    pub access_mode: AccessMode,
}

impl Delegate {
    /// `true` for a realm's unique root delegate.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
