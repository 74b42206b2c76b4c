//! Canonical, bidirectional mapping between a typed [`Node`] value and an
//! opaque byte body, and derivation of the [`ContentKey`] from that body.
//!
//! Wire encoding is DAG-CBOR (via `serde_ipld_dagcbor`, the same crate the
//! teacher repository uses for its own node wire format). Directory
//! children are sorted locale-insensitive lexicographically before
//! encoding, so two semantically equal directories built in different
//! orders collapse to the same bytes and the same key.

mod builder;
mod error;
mod key;
mod node;
mod wire;

pub use builder::DictBuilder;
pub use error::CodecError;
pub use key::ContentKey;
pub use node::{DictNode, FileNode, Node, SuccessorNode};

use bytes::Bytes;

/// Result of a successful encode: the canonical bytes and their content key.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Canonical wire bytes.
    pub bytes: Bytes,
    /// Content key derived from `bytes`.
    pub key: ContentKey,
}

/// Serialize a node and compute its content key.
pub fn encode(node: &Node) -> Result<Encoded, CodecError> {
    let wire = wire::WireNode::from_node(node);
    let bytes = serde_ipld_dagcbor::to_vec(&wire).map_err(CodecError::serialization)?;
    let bytes = Bytes::from(bytes);
    let key = ContentKey::of(&bytes);
    Ok(Encoded { bytes, key })
}

/// Deserialize a node from its canonical bytes.
///
/// Fails with [`CodecError::Malformed`] on any structural error.
pub fn decode(bytes: &[u8]) -> Result<Node, CodecError> {
    let wire: wire::WireNode =
        serde_ipld_dagcbor::from_slice(bytes).map_err(CodecError::malformed)?;
    wire.into_node()
}

/// Compute the content key of bytes already held by the caller.
pub fn key_of(bytes: &[u8]) -> ContentKey {
    ContentKey::of(bytes)
}

/// Convenience: build and encode a directory node from names and child keys.
///
/// Enforces name uniqueness via [`DictBuilder`]; the resulting node's
/// children are already in canonical order.
pub fn encode_dict(
    names: Vec<smol_str::SmolStr>,
    child_keys: Vec<ContentKey>,
) -> Result<Encoded, CodecError> {
    let dict = DictBuilder::new().extend(names, child_keys)?.build();
    encode(&Node::Dict(dict))
}

/// Convenience: build and encode a file node.
pub fn encode_file(
    data: Bytes,
    content_type: impl Into<String>,
    size: u64,
) -> Result<Encoded, CodecError> {
    encode(&Node::File(FileNode {
        content_type: content_type.into(),
        size,
        data,
        successor: None,
    }))
}

/// The canonical empty directory, used by `mkdir`.
pub fn empty_dict() -> Node {
    Node::Dict(DictBuilder::new().build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    #[test]
    fn round_trip_file() {
        let node = Node::File(FileNode {
            content_type: "text/plain".into(),
            size: 2,
            data: Bytes::from_static(b"hi"),
            successor: None,
        });
        let encoded = encode(&node).unwrap();
        let decoded = decode(&encoded.bytes).unwrap();
        assert_eq!(node, decoded);
        assert_eq!(encode(&decoded).unwrap().bytes, encoded.bytes);
    }

    #[test]
    fn round_trip_dict_any_construction_order() {
        let k1 = ContentKey::of(b"a");
        let k2 = ContentKey::of(b"b");

        let forward = DictBuilder::new()
            .insert(SmolStr::new("alpha"), k1)
            .unwrap()
            .insert(SmolStr::new("beta"), k2)
            .unwrap()
            .build();
        let backward = DictBuilder::new()
            .insert(SmolStr::new("beta"), k2)
            .unwrap()
            .insert(SmolStr::new("alpha"), k1)
            .unwrap()
            .build();

        let e1 = encode(&Node::Dict(forward)).unwrap();
        let e2 = encode(&Node::Dict(backward)).unwrap();
        assert_eq!(e1.bytes, e2.bytes);
        assert_eq!(e1.key, e2.key);
    }

    #[test]
    fn key_of_matches_encode_key() {
        let node = empty_dict();
        let encoded = encode(&node).unwrap();
        assert_eq!(key_of(&encoded.bytes), encoded.key);
    }

    #[test]
    fn decode_malformed_bytes_fails() {
        let err = decode(b"\xff\xff\xff not cbor").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }
}
