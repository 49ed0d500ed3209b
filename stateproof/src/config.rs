// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use typed_builder::TypedBuilder;

/// Limits applied while parsing an untrusted proof blob.
///
/// A malicious blob can claim arbitrarily large element counts and sizes;
/// these caps make it fail before any allocation grows past them. The
/// defaults are generous for real proofs, which hold one node per trie
/// level.
#[derive(Clone, Copy, TypedBuilder, Debug)]
pub struct ProofLimits {
    /// Maximum number of node entries in one proof blob.
    #[builder(default = 0x1_0000)]
    pub max_nodes: u64,

    /// Maximum size in bytes of a single length-prefixed field (the
    /// storage key or one proof node).
    #[builder(default = 0x10_0000)]
    pub max_element_size: usize,
}

impl Default for ProofLimits {
    fn default() -> Self {
        Self::builder().build()
    }
}
