// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! The trie node model and its exact binary wire format.
//!
//! | Kind      | Tag    | Payload                                   | Reference |
//! |-----------|--------|-------------------------------------------|-----------|
//! | Branch    | `0x00` | 17 children, each encoded as a child      | yes       |
//! | Extension | `0x01` | var-bytes nibble key + one child          | yes       |
//! | Leaf      | `0x02` | var-bytes value                           | yes       |
//! | Hash      | `0x03` | 32 raw digest bytes                       | no        |
//! | Empty     | `0x04` | none                                      | no        |
//!
//! "Encoded as a child" is the collapsing rule that keeps every encoded
//! node O(1): a Branch, Extension, or Leaf child is replaced by a Hash
//! node carrying its content hash, while Hash and Empty children are
//! written verbatim.

use enum_as_inner::EnumAsInner;
use thiserror::Error;

mod branch;
mod extension;
mod leaf;

pub use branch::BranchNode;
pub use extension::ExtensionNode;
pub use leaf::LeafNode;

use crate::codec::{ByteReader, ByteWriter, CodecError};
use crate::{Path, TrieHash, hash256};

const TAG_BRANCH: u8 = 0x00;
const TAG_EXTENSION: u8 = 0x01;
const TAG_LEAF: u8 = 0x02;
const TAG_HASH: u8 = 0x03;
const TAG_EMPTY: u8 = 0x04;

/// Upper bound on the nibble key of an extension node accepted by decode.
pub const MAX_KEY_LENGTH: usize = 1024;

/// Upper bound on a leaf value accepted by decode.
pub const MAX_VALUE_LENGTH: usize = 0x10_0000;

/// An error produced while decoding or constructing a trie node.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The underlying byte format was malformed or truncated.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The leading type byte named no known node kind.
    #[error("unknown node tag {0:#04x}")]
    UnknownTag(u8),
    /// A child position held something other than a hash reference or an
    /// empty node.
    #[error("child position holds tag {0:#04x}, expected a hash reference or empty")]
    InvalidChildTag(u8),
    /// An extension node carried no key nibbles.
    #[error("extension node key is empty")]
    EmptyKey,
    /// An extension key byte was outside the nibble range.
    #[error("extension node key byte {0:#04x} is not a nibble")]
    InvalidNibble(u8),
    /// A leaf node carried no value bytes.
    #[error("leaf node value is empty")]
    EmptyValue,
}

/// A node in the trie.
///
/// The five kinds form a closed union; sharing between subtrees is only
/// ever expressed through [`Node::Hash`] content references, so the tree
/// edges (`Branch` children, `Extension::next`) each have a single owner.
#[derive(Clone, Debug, PartialEq, Eq, EnumAsInner)]
pub enum Node {
    /// Fixed 17-way fan-out.
    Branch(Box<BranchNode>),
    /// A compressed run of shared nibbles.
    Extension(Box<ExtensionNode>),
    /// A value at the end of a fully consumed path.
    Leaf(LeafNode),
    /// A content reference: the real node lives elsewhere and its
    /// serialization hashes to this digest.
    Hash(TrieHash),
    /// Nothing stored here.
    Empty,
}

impl From<BranchNode> for Node {
    fn from(node: BranchNode) -> Self {
        Node::Branch(Box::new(node))
    }
}

impl From<ExtensionNode> for Node {
    fn from(node: ExtensionNode) -> Self {
        Node::Extension(Box::new(node))
    }
}

impl From<LeafNode> for Node {
    fn from(node: LeafNode) -> Self {
        Node::Leaf(node)
    }
}

impl Node {
    /// Decodes one node from `reader`.
    ///
    /// Child positions inside Branch and Extension payloads only ever hold
    /// what [`Node::encode_as_child`] emits — a hash reference or an empty
    /// marker — so they are parsed with that grammar; an inlined node there
    /// is a decode failure.
    ///
    /// Branch, Extension, and Leaf nodes carry a trailing reference-count
    /// var-uint when they are persisted by a store, but travel without it
    /// inside proofs — that shorter form is exactly the preimage of the
    /// node's content hash. Decode therefore consumes the field when bytes
    /// remain and defaults it to 0 otherwise.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let node = match reader.read_u8()? {
            TAG_BRANCH => {
                let mut branch = BranchNode::new();
                for child in &mut branch.children {
                    *child = decode_child(reader)?;
                }
                branch.reference = read_reference(reader)?;
                branch.into()
            }
            TAG_EXTENSION => {
                let key = reader.read_var_bytes(MAX_KEY_LENGTH)?;
                let next = decode_child(reader)?;
                let mut ext = ExtensionNode::new(Path::from(key), next)?;
                ext.reference = read_reference(reader)?;
                ext.into()
            }
            TAG_LEAF => {
                let mut leaf = LeafNode::new(reader.read_var_bytes(MAX_VALUE_LENGTH)?)?;
                leaf.reference = read_reference(reader)?;
                leaf.into()
            }
            TAG_HASH => Node::Hash(TrieHash::from(reader.read_array()?)),
            TAG_EMPTY => Node::Empty,
            tag => return Err(DecodeError::UnknownTag(tag)),
        };
        Ok(node)
    }

    /// Decodes a node that must span the whole of `bytes`.
    ///
    /// This is the entry point for proof entries; trailing garbage after
    /// the node is a decode failure, never silently ignored.
    pub fn decode_all(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        let node = Self::decode(&mut reader)?;
        reader.expect_eof()?;
        Ok(node)
    }

    /// Serializes the node, including the reference count where the kind
    /// carries one.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write(&mut writer, true);
        writer.into_vec()
    }

    /// Serializes the node without the reference count.
    ///
    /// This is the exact preimage of [`Node::hash`].
    #[must_use]
    pub fn encode_without_reference(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write(&mut writer, false);
        writer.into_vec()
    }

    /// Serializes the node the way a parent embeds it.
    #[must_use]
    pub fn encode_as_child(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.write_as_child(&mut writer);
        writer.into_vec()
    }

    /// The node's content hash.
    ///
    /// Computed as double SHA-256 of [`Node::encode_without_reference`]
    /// and memoized per instance; for a [`Node::Hash`] the digest itself.
    pub fn hash(&self) -> TrieHash {
        match self {
            Node::Branch(node) => *node
                .cached_hash
                .get_or_init(|| hash256(&self.encode_without_reference())),
            Node::Extension(node) => *node
                .cached_hash
                .get_or_init(|| hash256(&self.encode_without_reference())),
            Node::Leaf(node) => *node
                .cached_hash
                .get_or_init(|| hash256(&self.encode_without_reference())),
            Node::Hash(digest) => *digest,
            Node::Empty => hash256(&[TAG_EMPTY]),
        }
    }

    fn write(&self, writer: &mut ByteWriter, with_reference: bool) {
        match self {
            Node::Branch(branch) => {
                writer.write_u8(TAG_BRANCH);
                for child in &branch.children {
                    child.write_as_child(writer);
                }
                if with_reference {
                    writer.write_var_uint(branch.reference);
                }
            }
            Node::Extension(ext) => {
                writer.write_u8(TAG_EXTENSION);
                writer.write_var_bytes(&ext.key);
                ext.next.write_as_child(writer);
                if with_reference {
                    writer.write_var_uint(ext.reference);
                }
            }
            Node::Leaf(leaf) => {
                writer.write_u8(TAG_LEAF);
                writer.write_var_bytes(&leaf.value);
                if with_reference {
                    writer.write_var_uint(leaf.reference);
                }
            }
            Node::Hash(digest) => {
                writer.write_u8(TAG_HASH);
                writer.write_bytes(digest.as_ref());
            }
            Node::Empty => writer.write_u8(TAG_EMPTY),
        }
    }

    fn write_as_child(&self, writer: &mut ByteWriter) {
        match self {
            Node::Branch(_) | Node::Extension(_) | Node::Leaf(_) => {
                writer.write_u8(TAG_HASH);
                writer.write_bytes(self.hash().as_ref());
            }
            Node::Hash(_) | Node::Empty => self.write(writer, false),
        }
    }
}

fn read_reference(reader: &mut ByteReader<'_>) -> Result<u64, CodecError> {
    if reader.is_empty() {
        Ok(0)
    } else {
        reader.read_var_uint(u64::MAX)
    }
}

/// Decodes a child position: the inverse of [`Node::encode_as_child`].
fn decode_child(reader: &mut ByteReader<'_>) -> Result<Node, DecodeError> {
    match reader.read_u8()? {
        TAG_HASH => Ok(Node::Hash(TrieHash::from(reader.read_array()?))),
        TAG_EMPTY => Ok(Node::Empty),
        tag => Err(DecodeError::InvalidChildTag(tag)),
    }
}
