//! Bearer credential decoding.
//!
//! Two shapes share one bearer header. The source told them apart by
//! searching for a dot character; we keep that discriminator (see
//! `jacquard_common::service_auth::parse_jwt`'s dot-split) but additionally
//! require a decoded branch id to be non-empty printable ASCII.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use coppice_delegate::DelegateId;
use serde::Deserialize;

use crate::error::AuthError;

/// Claims carried by the dotted credential shape's middle segment.
#[derive(Debug, Clone, Deserialize)]
pub struct DottedClaims {
    /// Subject: the user id. The realm id equals this value.
    pub sub: String,
    /// Optional client id, carried through to a matched delegate caller.
    #[serde(default)]
    pub client_id: Option<String>,
}

/// A decoded bearer credential, before it is matched against the delegate
/// store.
#[derive(Debug, Clone)]
pub enum RawCredential {
    /// Shape 1: three-part dotted structure.
    Dotted(DottedClaims),
    /// Shape 2: a bare branch id.
    BranchToken(DelegateId),
}

/// Decode a bearer token into one of the two recognized shapes.
pub fn decode_credential(bearer: &str) -> Result<RawCredential, AuthError> {
    if bearer.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    if bearer.contains('.') {
        let parts: Vec<&str> = bearer.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::MalformedDotted(parts.len()));
        }
        let payload = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|_| AuthError::InvalidBase64)?;
        let claims: DottedClaims = serde_json::from_slice(&payload)?;
        Ok(RawCredential::Dotted(claims))
    } else {
        let decoded = URL_SAFE_NO_PAD.decode(bearer).map_err(|_| AuthError::InvalidBase64)?;
        let text = String::from_utf8(decoded).map_err(|_| AuthError::InvalidBranchId)?;
        if text.is_empty() || !text.is_ascii() {
            return Err(AuthError::InvalidBranchId);
        }
        Ok(RawCredential::BranchToken(DelegateId::new(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dotted(sub: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
        let sig = URL_SAFE_NO_PAD.encode(b"sig");
        format!("{header}.{payload}.{sig}")
    }

    #[test]
    fn decodes_dotted_shape() {
        let token = dotted("alice");
        match decode_credential(&token).unwrap() {
            RawCredential::Dotted(claims) => assert_eq!(claims.sub, "alice"),
            _ => panic!("expected dotted shape"),
        }
    }

    #[test]
    fn decodes_branch_token_shape() {
        let id = DelegateId::generate();
        let token = URL_SAFE_NO_PAD.encode(id.as_str().as_bytes());
        match decode_credential(&token).unwrap() {
            RawCredential::BranchToken(decoded) => assert_eq!(decoded, id),
            _ => panic!("expected branch token shape"),
        }
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(matches!(
            decode_credential("a.b"),
            Err(AuthError::MalformedDotted(2))
        ));
    }

    #[test]
    fn rejects_empty_credential() {
        assert!(matches!(decode_credential(""), Err(AuthError::MissingCredential)));
    }

    #[test]
    fn rejects_non_base64_branch_token() {
        assert!(matches!(
            decode_credential("not valid base64!!!"),
            Err(AuthError::InvalidBase64)
        ));
    }
}
