//! On-wire (DAG-CBOR) node representation.
//!
//! Kept separate from the in-memory [`Node`] type per the re-architecture
//! note: the codec is the only module with knowledge of wire layout.

use smol_str::SmolStr;

use crate::{CodecError, ContentKey, DictBuilder, DictNode, FileNode, Node, SuccessorNode};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) enum WireNode {
    File(WireFile),
    Dict(WireDict),
    Successor(WireSuccessor),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct WireFile {
    content_type: String,
    size: u64,
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
    successor: Option<ContentKey>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct WireDict {
    names: Vec<String>,
    child_keys: Vec<ContentKey>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct WireSuccessor {
    next: ContentKey,
}

impl WireNode {
    pub(crate) fn from_node(node: &Node) -> Self {
        match node {
            Node::File(f) => WireNode::File(WireFile {
                content_type: f.content_type.clone(),
                size: f.size,
                data: f.data.to_vec(),
                successor: f.successor,
            }),
            Node::Dict(d) => WireNode::Dict(WireDict {
                names: d.names.iter().map(|n| n.to_string()).collect(),
                child_keys: d.child_keys.clone(),
            }),
            Node::Successor(s) => WireNode::Successor(WireSuccessor { next: s.next }),
        }
    }

    pub(crate) fn into_node(self) -> Result<Node, CodecError> {
        match self {
            WireNode::File(f) => Ok(Node::File(FileNode {
                content_type: f.content_type,
                size: f.size,
                data: bytes::Bytes::from(f.data),
                successor: f.successor,
            })),
            WireNode::Dict(d) => {
                let names: Vec<SmolStr> = d.names.into_iter().map(SmolStr::new).collect();
                let dict: DictNode = DictBuilder::new()
                    .extend(names, d.child_keys)
                    .map_err(|e| CodecError::malformed(WrappedCodecError(e)))?
                    .build();
                Ok(Node::Dict(dict))
            }
            WireNode::Successor(s) => Ok(Node::Successor(SuccessorNode { next: s.next })),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct WrappedCodecError(CodecError);
