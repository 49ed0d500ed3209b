// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::fmt::{Debug, Error as FmtError, Formatter};
use std::sync::OnceLock;

use super::DecodeError;
use crate::{Node, Path, TrieHash};

/// An extension node: a compressed run of shared nibbles ahead of `next`.
#[derive(Clone)]
pub struct ExtensionNode {
    /// The shared nibble run. Never empty.
    pub key: Path,

    /// The node the run leads to; on the wire this is a hash reference
    /// unless it is empty.
    pub next: Node,

    /// On-wire reference count. Bookkeeping for stores that share
    /// subtrees; never part of the node's identity.
    pub reference: u64,

    pub(crate) cached_hash: OnceLock<TrieHash>,
}

impl ExtensionNode {
    /// Creates an extension over `key` leading to `next`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::EmptyKey`] if `key` has no nibbles, and
    /// [`DecodeError::InvalidNibble`] if any element is not a nibble — an
    /// extension that matches nothing is an invalid state, not an empty
    /// node.
    pub fn new(key: Path, next: Node) -> Result<Self, DecodeError> {
        if key.is_empty() {
            return Err(DecodeError::EmptyKey);
        }
        if let Some(byte) = key.iter().find(|byte| **byte > 0xf) {
            return Err(DecodeError::InvalidNibble(*byte));
        }
        Ok(Self {
            key,
            next,
            reference: 1,
            cached_hash: OnceLock::new(),
        })
    }
}

impl PartialEq for ExtensionNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.next == other.next
    }
}

impl Eq for ExtensionNode {}

impl Debug for ExtensionNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "[Extension {:?}-> {:?}]", self.key, self.next)
    }
}
