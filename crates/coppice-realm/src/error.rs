//! Authentication-specific errors, folded into `coppice_common::CoreError`
//! by the service layer.

/// Errors raised while decoding or validating a bearer credential.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer credential was supplied.
    #[error("missing credential")]
    MissingCredential,

    /// The dotted credential did not have exactly three parts.
    #[error("malformed credential: expected 3 dot-separated parts, got {0}")]
    MalformedDotted(usize),

    /// The credential's base64 segment failed to decode.
    #[error("credential is not valid base64")]
    InvalidBase64,

    /// The decoded JSON segment was not a valid claims object.
    #[error("credential payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The decoded branch id was empty or contained non-ASCII bytes.
    #[error("branch token does not decode to a printable ascii id")]
    InvalidBranchId,

    /// No delegate exists for the decoded identity.
    #[error("no delegate found for this credential")]
    UnknownDelegate,

    /// The matched delegate's lifetime has expired.
    #[error("credential has expired")]
    Expired,
}
