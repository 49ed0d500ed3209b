// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::collections::HashMap;

use metrics::counter;

use crate::{TrieHash, hash256};

/// A read-only, content-keyed store of serialized trie nodes.
///
/// Built once per verification call from the flat proof list; every entry
/// is keyed by the hash of its own bytes, computed here. The store never
/// accepts an externally asserted hash, so a lookup can only ever return
/// bytes that genuinely hash to the requested digest — this is the trust
/// anchor of the whole crate.
#[derive(Debug, Clone, Default)]
pub struct ProofDb {
    nodes: HashMap<TrieHash, Box<[u8]>>,
}

impl ProofDb {
    /// Builds a store from raw proof entries.
    ///
    /// Duplicate entries collapse; two distinct entries with the same hash
    /// would be a double-SHA-256 collision, so last write wins.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let nodes = entries
            .into_iter()
            .map(|entry| {
                let bytes = entry.as_ref();
                (hash256(bytes), Box::from(bytes))
            })
            .collect();
        Self { nodes }
    }

    /// Looks up the entry whose content hashes to `hash`.
    ///
    /// A plain map read; no further validation is needed because the key
    /// was recomputed from the entry at build time.
    #[must_use]
    pub fn get(&self, hash: &TrieHash) -> Option<&[u8]> {
        let entry = self.nodes.get(hash);
        match entry {
            Some(_) => counter!("stateproof.proofdb.hit").increment(1),
            None => counter!("stateproof.proofdb.miss").increment(1),
        }
        entry.map(AsRef::as_ref)
    }

    /// The number of distinct entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
