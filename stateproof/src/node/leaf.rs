// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::fmt::{Debug, Error as FmtError, Formatter};
use std::sync::OnceLock;

use super::DecodeError;
use crate::TrieHash;

/// A leaf node holding the value for a fully consumed path.
#[derive(Clone)]
pub struct LeafNode {
    /// The stored value bytes. Never empty.
    pub value: Box<[u8]>,

    /// On-wire reference count. Bookkeeping for stores that share
    /// subtrees; never part of the node's identity.
    pub reference: u64,

    pub(crate) cached_hash: OnceLock<TrieHash>,
}

impl LeafNode {
    /// Creates a leaf holding `value`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::EmptyValue`] if `value` has no bytes — absence is
    /// expressed by an empty node, not by a valueless leaf.
    pub fn new(value: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(DecodeError::EmptyValue);
        }
        Ok(Self {
            value: value.into(),
            reference: 1,
            cached_hash: OnceLock::new(),
        })
    }
}

impl PartialEq for LeafNode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for LeafNode {}

impl Debug for LeafNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "[Leaf {}]", hex::encode(&self.value))
    }
}
