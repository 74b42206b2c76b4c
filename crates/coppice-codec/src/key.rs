//! Content key: a short byte sequence derived from a node's encoded bytes.
//!
//! Two forms circulate: the raw 16-byte binary key (used internally by the
//! codec and stores) and a printable multibase-encoded form (used as an
//! external identifier). Conversion between them is total and mutually
//! inverse.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::CodecError;

/// Length in bytes of a [`ContentKey`].
pub const KEY_LEN: usize = 16;

const PRINTABLE_BASE: multibase::Base = multibase::Base::Base32Lower;

/// A content-addressed key derived deterministically from a node's encoded
/// bytes: the first 16 bytes of the SHA-256 digest, with byte 0 replaced by
/// a size-class flag (`floor(log2(len))`, clamped to `u8`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentKey([u8; KEY_LEN]);

impl ContentKey {
    /// Derive the content key of the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut raw = [0u8; KEY_LEN];
        raw.copy_from_slice(&digest[..KEY_LEN]);
        raw[0] = size_flag(bytes.len());
        ContentKey(raw)
    }

    /// Raw 16-byte form, for codec-internal references.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Build a key from its raw 16-byte form.
    pub fn from_bytes(raw: [u8; KEY_LEN]) -> Self {
        ContentKey(raw)
    }

    /// Printable external identifier: multibase base32-lower of the raw bytes.
    pub fn to_printable(&self) -> String {
        multibase::encode(PRINTABLE_BASE, self.0)
    }

    /// Parse a printable external identifier back into a key.
    pub fn from_printable(s: &str) -> Result<Self, CodecError> {
        let (_, raw) =
            multibase::decode(s).map_err(|e| CodecError::malformed(InvalidPrintableKey(e.to_string())))?;
        if raw.len() != KEY_LEN {
            return Err(CodecError::malformed(InvalidPrintableKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                raw.len()
            ))));
        }
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(&raw);
        Ok(ContentKey(out))
    }
}

/// Floor of log2(len), 0 for a zero-length body.
fn size_flag(len: usize) -> u8 {
    if len == 0 {
        return 0;
    }
    (usize::BITS - 1 - len.leading_zeros()) as u8
}

#[derive(Debug, thiserror::Error)]
#[error("invalid printable content key: {0}")]
struct InvalidPrintableKey(String);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({})", self.to_printable())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_printable())
    }
}

impl FromStr for ContentKey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_printable(s)
    }
}

impl serde::Serialize for ContentKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_bytes::serialize(&self.0[..], serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ContentKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = serde_bytes::deserialize(deserializer)?;
        if bytes.len() != KEY_LEN {
            return Err(serde::de::Error::custom(format!(
                "content key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut raw = [0u8; KEY_LEN];
        raw.copy_from_slice(&bytes);
        Ok(ContentKey(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_round_trip() {
        let key = ContentKey::of(b"hello world");
        let printable = key.to_printable();
        let parsed = ContentKey::from_printable(&printable).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn same_body_same_key() {
        assert_eq!(ContentKey::of(b"abc"), ContentKey::of(b"abc"));
    }

    #[test]
    fn distinct_bodies_distinct_keys() {
        assert_ne!(ContentKey::of(b"abc"), ContentKey::of(b"abd"));
    }

    #[test]
    fn from_printable_rejects_wrong_length() {
        let bogus = multibase::encode(multibase::Base::Base32Lower, [0u8; 8]);
        assert!(ContentKey::from_printable(&bogus).is_err());
    }

    #[test]
    fn size_flag_is_monotonic_log2_floor() {
        assert_eq!(size_flag(0), 0);
        assert_eq!(size_flag(1), 0);
        assert_eq!(size_flag(2), 1);
        assert_eq!(size_flag(3), 1);
        assert_eq!(size_flag(4), 2);
        assert_eq!(size_flag(1023), 9);
        assert_eq!(size_flag(1024), 10);
    }
}
