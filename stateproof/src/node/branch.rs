// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::fmt::{Debug, Error as FmtError, Formatter};
use std::sync::OnceLock;

use crate::{Node, TrieHash};

/// A branch node: one child per nibble value plus the value child.
#[derive(Clone)]
pub struct BranchNode {
    /// The children of this branch. Slots 0–15 correspond to the next
    /// nibble of the path; slot 16 holds the child for a path that is
    /// fully consumed at this branch.
    pub children: [Node; 17],

    /// On-wire reference count. Bookkeeping for stores that share
    /// subtrees; never part of the node's identity.
    pub reference: u64,

    pub(crate) cached_hash: OnceLock<TrieHash>,
}

impl BranchNode {
    /// The exact number of children in a branch node.
    pub const CHILD_COUNT: usize = 17;

    /// The slot holding the value-terminating child.
    pub const VALUE_CHILD: usize = 16;

    /// Creates a branch with every child empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: std::array::from_fn(|_| Node::Empty),
            reference: 1,
            cached_hash: OnceLock::new(),
        }
    }
}

impl Default for BranchNode {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BranchNode {
    fn eq(&self, other: &Self) -> bool {
        // Identity is content only; the reference count and the memoized
        // hash are excluded.
        self.children == other.children
    }
}

impl Eq for BranchNode {}

impl Debug for BranchNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "[Branch")?;
        for (i, child) in self.children.iter().enumerate() {
            if !matches!(child, Node::Empty) {
                write!(f, " ({i}: {child:?})")?;
            }
        }
        write!(f, "]")
    }
}
