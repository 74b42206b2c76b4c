//! Delegate identifiers and token fingerprinting.
//!
//! A [`DelegateId`] is an opaque ASCII string (root delegates and branches
//! alike). A branch's bearer access token is the URL-safe base64 of its id's
//! bytes; [`access_token_for`] / [`decode_branch_token`] are mutual inverses.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{RngCore, rngs::ThreadRng};
use sha2::{Digest, Sha256};
use smol_str::SmolStr;

/// Opaque delegate identifier, unique across all realms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelegateId(SmolStr);

impl DelegateId {
    /// Wrap an existing ASCII string as a delegate id.
    pub fn new(raw: impl Into<SmolStr>) -> Self {
        Self(raw.into())
    }

    /// `true` if this id's bytes are all printable ASCII (required of any
    /// decoded branch id before it is accepted as a credential).
    pub fn is_valid_ascii(&self) -> bool {
        !self.0.is_empty() && self.0.as_str().is_ascii()
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Generate a fresh, random delegate id: 16 random bytes, URL-safe
    /// base64 (itself always printable ASCII).
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        ThreadRng::default().fill_bytes(&mut bytes);
        Self(SmolStr::new(URL_SAFE_NO_PAD.encode(bytes)))
    }
}

impl fmt::Display for DelegateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-way fingerprint of a bearer token's bytes, stored on the delegate
/// record instead of the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenFingerprint([u8; 32]);

impl TokenFingerprint {
    /// Fingerprint the given token bytes.
    pub fn of(token_bytes: &[u8]) -> Self {
        let digest = Sha256::digest(token_bytes);
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&digest);
        TokenFingerprint(raw)
    }
}

/// The bearer access token for a branch: URL-safe base64 of its id's bytes.
pub fn access_token_for(id: &DelegateId) -> String {
    URL_SAFE_NO_PAD.encode(id.as_str().as_bytes())
}

/// Decode a bearer token back into the branch id it names, if it is
/// URL-safe base64 of a non-empty ASCII string.
pub fn decode_branch_token(token: &str) -> Option<DelegateId> {
    let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
    let text = String::from_utf8(raw).ok()?;
    if text.is_empty() || !text.is_ascii() {
        return None;
    }
    Some(DelegateId::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_ascii_and_unique() {
        let a = DelegateId::generate();
        let b = DelegateId::generate();
        assert!(a.is_valid_ascii());
        assert!(b.is_valid_ascii());
        assert_ne!(a, b);
    }

    #[test]
    fn access_token_round_trips_to_id() {
        let id = DelegateId::generate();
        let token = access_token_for(&id);
        assert_eq!(decode_branch_token(&token), Some(id));
    }

    #[test]
    fn decode_rejects_non_base64() {
        assert_eq!(decode_branch_token("not base64!!"), None);
    }

    #[test]
    fn fingerprint_is_deterministic_and_sensitive_to_input() {
        let f1 = TokenFingerprint::of(b"token-a");
        let f2 = TokenFingerprint::of(b"token-a");
        let f3 = TokenFingerprint::of(b"token-b");
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }
}
