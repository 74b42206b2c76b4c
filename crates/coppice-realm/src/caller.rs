//! The authenticated caller and its derived capability predicates.
//!
//! Consolidates the capability checks the source scattered across handlers
//! into the three predicates below, computed once at authentication time.

use coppice_delegate::{AccessMode, DelegateId, Permission};

/// An authenticated request's identity and realm context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// A direct user credential. The realm id equals the user id.
    User(String),
    /// A matched long-term-delegate credential, carrying fine-grained
    /// permissions.
    Delegate {
        /// The realm this delegate belongs to.
        realm: String,
        /// The matched delegate's id.
        delegate_id: DelegateId,
        /// Client id carried by the credential, if present.
        client_id: Option<String>,
        /// Permissions granted to this delegate.
        permissions: Vec<Permission>,
    },
    /// A branch worker credential.
    Worker {
        /// The branch's realm.
        realm: String,
        /// The branch's delegate id.
        branch_id: DelegateId,
        /// Read/write mode granted to this worker.
        access_mode: AccessMode,
    },
}

impl Caller {
    /// The realm this caller is bound to.
    pub fn realm(&self) -> &str {
        match self {
            Caller::User(id) => id.as_str(),
            Caller::Delegate { realm, .. } => realm.as_str(),
            Caller::Worker { realm, .. } => realm.as_str(),
        }
    }

    /// The delegate id this caller authenticates through, if it is not a
    /// direct user credential (which is always bound to the realm's root
    /// delegate, resolved separately).
    pub fn delegate_id(&self) -> Option<&DelegateId> {
        match self {
            Caller::User(_) => None,
            Caller::Delegate { delegate_id, .. } => Some(delegate_id),
            Caller::Worker { branch_id, .. } => Some(branch_id),
        }
    }

    /// True for users, delegates with `file_read`, and any worker.
    pub fn may_read(&self) -> bool {
        match self {
            Caller::User(_) => true,
            Caller::Delegate { permissions, .. } => permissions.contains(&Permission::FileRead),
            Caller::Worker { .. } => true,
        }
    }

    /// True for users, delegates with `file_write`, and read-write workers.
    pub fn may_write(&self) -> bool {
        match self {
            Caller::User(_) => true,
            Caller::Delegate { permissions, .. } => permissions.contains(&Permission::FileWrite),
            Caller::Worker { access_mode, .. } => matches!(access_mode, AccessMode::ReadWrite),
        }
    }

    /// True for users and delegates with `branch_manage`. Workers never
    /// manage branches.
    pub fn may_manage_branches(&self) -> bool {
        match self {
            Caller::User(_) => true,
            Caller::Delegate { permissions, .. } => permissions.contains(&Permission::BranchManage),
            Caller::Worker { .. } => false,
        }
    }
}
