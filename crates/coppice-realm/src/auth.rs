//! Credential decoding plus delegate-store lookup, producing an
//! authenticated [`Caller`].

use chrono::Utc;
use coppice_delegate::{Delegate, DelegateStore, TokenFingerprint, access_token_for};

use crate::caller::Caller;
use crate::credential::{RawCredential, decode_credential};
use crate::error::AuthError;

/// Authenticate a bearer credential against the delegate store.
///
/// Shape 1 (dotted) resolves to a [`Caller::User`] unless a long-term
/// delegate record in the decoded subject's realm has a matching token
/// fingerprint, in which case it resolves to [`Caller::Delegate`]. Shape 2
/// (bare branch token) resolves to [`Caller::Worker`] if a live delegate
/// with that id exists. `refresh_window_ms` is the rolling access window
/// granted to an unlimited-lifetime delegate on each successful auth.
pub async fn authenticate<D: DelegateStore>(
    delegates: &D,
    bearer: &str,
    refresh_window_ms: u64,
) -> Result<Caller, AuthError> {
    match decode_credential(bearer)? {
        RawCredential::Dotted(claims) => {
            let fingerprint = TokenFingerprint::of(bearer.as_bytes());
            let realm_delegates = delegates
                .list_delegates(&claims.sub)
                .await
                .map_err(|_| AuthError::UnknownDelegate)?;
            let matched = realm_delegates
                .into_iter()
                .find(|d| !d.is_root() && d.token_fingerprint == fingerprint);

            match matched {
                Some(d) if d.lifetime.is_valid_at(Utc::now()) => Ok(Caller::Delegate {
                    realm: d.realm_id,
                    delegate_id: d.id,
                    client_id: claims.client_id,
                    permissions: d.permissions,
                }),
                Some(_) => Err(AuthError::Expired),
                None => Ok(Caller::User(claims.sub)),
            }
        }
        RawCredential::BranchToken(id) => {
            if !id.is_valid_ascii() {
                return Err(AuthError::InvalidBranchId);
            }
            let delegate: Delegate = delegates
                .get_delegate(&id)
                .await
                .map_err(|_| AuthError::UnknownDelegate)?
                .ok_or(AuthError::UnknownDelegate)?;

            let now = Utc::now();
            if !delegate.lifetime.is_valid_at(now) {
                return Err(AuthError::Expired);
            }
            if matches!(delegate.lifetime, coppice_delegate::Lifetime::Unlimited { .. }) {
                // Roll the access window forward; best-effort, auth still
                // succeeds even if the refresh write races or fails.
                let rolled = now + chrono::Duration::milliseconds(refresh_window_ms as i64);
                let _ = delegates.touch_access_expiry(&delegate.id, rolled).await;
            }

            Ok(Caller::Worker {
                realm: delegate.realm_id,
                branch_id: delegate.id,
                access_mode: delegate.access_mode,
            })
        }
    }
}

/// Recompute the access token bound to a worker caller. Exposed so callers
/// that only hold a `Caller::Worker` (e.g. in tests) can reconstruct the
/// bearer header without re-deriving the encoding scheme themselves.
pub fn worker_bearer_token(caller: &Caller) -> Option<String> {
    match caller {
        Caller::Worker { branch_id, .. } => Some(access_token_for(branch_id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use coppice_delegate::{AccessMode, DelegateId, InMemoryDelegateStore, Lifetime};

    use super::*;

    fn bearer_for_user(sub: &str) -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
        let sig = URL_SAFE_NO_PAD.encode(b"sig");
        format!("{header}.{payload}.{sig}")
    }

    #[tokio::test]
    async fn dotted_credential_with_no_matching_delegate_is_a_user() {
        let store = InMemoryDelegateStore::new();
        let caller = authenticate(&store, &bearer_for_user("alice"), 3_600_000).await.unwrap();
        assert_eq!(caller, Caller::User("alice".into()));
    }

    #[tokio::test]
    async fn branch_token_resolves_to_worker() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("alice").await.unwrap();
        let id = DelegateId::generate();
        let token = access_token_for(&id);
        store
            .insert_delegate(Delegate {
                id: id.clone(),
                realm_id: "alice".into(),
                parent_id: Some(root.id.clone()),
                mount_path: "work".into(),
                token_fingerprint: TokenFingerprint::of(token.as_bytes()),
                lifetime: Lifetime::Limited {
                    expiry: Utc::now() + Duration::minutes(5),
                },
                closed: false,
                permissions: vec![],
                access_mode: AccessMode::ReadWrite,
            })
            .await
            .unwrap();

        let caller = authenticate(&store, &token, 3_600_000).await.unwrap();
        assert_eq!(
            caller,
            Caller::Worker {
                realm: "alice".into(),
                branch_id: id,
                access_mode: AccessMode::ReadWrite,
            }
        );
    }

    #[tokio::test]
    async fn expired_branch_token_is_rejected() {
        let store = InMemoryDelegateStore::new();
        let id = DelegateId::generate();
        let token = access_token_for(&id);
        store
            .insert_delegate(Delegate {
                id: id.clone(),
                realm_id: "alice".into(),
                parent_id: Some(DelegateId::generate()),
                mount_path: "work".into(),
                token_fingerprint: TokenFingerprint::of(token.as_bytes()),
                lifetime: Lifetime::Limited {
                    expiry: Utc::now() - Duration::minutes(5),
                },
                closed: false,
                permissions: vec![],
                access_mode: AccessMode::ReadWrite,
            })
            .await
            .unwrap();

        assert!(matches!(authenticate(&store, &token, 3_600_000).await, Err(AuthError::Expired)));
    }

    #[tokio::test]
    async fn unknown_branch_token_is_unauthorized() {
        let store = InMemoryDelegateStore::new();
        let bogus = access_token_for(&DelegateId::generate());
        assert!(matches!(
            authenticate(&store, &bogus, 3_600_000).await,
            Err(AuthError::UnknownDelegate)
        ));
    }

    #[tokio::test]
    async fn matching_long_term_delegate_takes_precedence_over_user() {
        let store = InMemoryDelegateStore::new();
        let root = store.get_or_create_root_delegate("alice").await.unwrap();
        let bearer = bearer_for_user("alice");
        let delegate_id = DelegateId::generate();
        store
            .insert_delegate(Delegate {
                id: delegate_id.clone(),
                realm_id: "alice".into(),
                parent_id: Some(root.id.clone()),
                mount_path: String::new(),
                token_fingerprint: TokenFingerprint::of(bearer.as_bytes()),
                lifetime: Lifetime::Unlimited {
                    access_expiry: Utc::now() + Duration::minutes(5),
                },
                closed: false,
                permissions: vec![coppice_delegate::Permission::FileRead],
                access_mode: AccessMode::ReadOnly,
            })
            .await
            .unwrap();

        let caller = authenticate(&store, &bearer, 3_600_000).await.unwrap();
        assert!(matches!(caller, Caller::Delegate { delegate_id: ref d, .. } if *d == delegate_id));
    }
}
