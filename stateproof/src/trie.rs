// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use thiserror::Error;

use crate::logger::trace;
use crate::node::{BranchNode, DecodeError, Node};
use crate::{Path, ProofDb, TrieHash};

/// An error produced while walking a proven trie.
///
/// A key that is genuinely absent is not an error; [`Trie::get`] reports
/// it as `Ok(None)` so callers can tell "no value" from "cannot prove".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    /// A resolved proof entry did not decode as a node.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A hash reference had no matching entry in the proof store; the
    /// supplied proof set is insufficient, which only a new proof from the
    /// source can fix.
    #[error("proof is missing the node with hash {0}")]
    ProofIncomplete(TrieHash),
}

/// A read-only trie anchored at one root node, hydrated lazily from a
/// [`ProofDb`].
///
/// The walk only ever decodes entries actually encountered on the lookup
/// path, so garbage elsewhere in the proof set is never even parsed.
#[derive(Debug)]
pub struct Trie {
    root: Node,
    db: ProofDb,
}

impl Trie {
    /// Creates a trie over `db` rooted at `root`.
    #[must_use]
    pub const fn new(root: Node, db: ProofDb) -> Self {
        Self { root, db }
    }

    /// Creates a trie whose root is a hash reference to `root_hash`.
    ///
    /// This is the usual entry point for verification: the root hash is
    /// the one externally trusted value, and everything below it must
    /// chain up to it.
    #[must_use]
    pub const fn from_root_hash(root_hash: TrieHash, db: ProofDb) -> Self {
        Self::new(Node::Hash(root_hash), db)
    }

    /// Resolves `key` to its stored value.
    ///
    /// Returns `Ok(None)` when the trie provably holds nothing for `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Box<[u8]>>, TrieError> {
        let path = Path::from_key(key);
        self.get_node(&self.root, &path)
    }

    fn get_node(&self, node: &Node, path: &[u8]) -> Result<Option<Box<[u8]>>, TrieError> {
        match node {
            Node::Leaf(leaf) => {
                // A leaf reached with leftover path nibbles is a genuine
                // absence, not a malformed trie.
                if path.is_empty() {
                    Ok(Some(leaf.value.clone()))
                } else {
                    Ok(None)
                }
            }
            Node::Branch(branch) => match path.split_first() {
                None => self.get_node(&branch.children[BranchNode::VALUE_CHILD], path),
                #[allow(clippy::indexing_slicing, reason = "nibbles are below the child count")]
                Some((&nibble, rest)) => self.get_node(&branch.children[usize::from(nibble)], rest),
            },
            Node::Extension(ext) => match path.strip_prefix(&*ext.key) {
                Some(rest) => self.get_node(&ext.next, rest),
                None => Ok(None),
            },
            Node::Hash(digest) => {
                let resolved = self.resolve(*digest)?;
                self.get_node(&resolved, path)
            }
            Node::Empty => Ok(None),
        }
    }

    /// Fetches and decodes the node behind a hash reference.
    fn resolve(&self, digest: TrieHash) -> Result<Node, TrieError> {
        let Some(bytes) = self.db.get(&digest) else {
            return Err(TrieError::ProofIncomplete(digest));
        };
        trace!("resolved {digest} to {} proof bytes", bytes.len());
        Ok(Node::decode_all(bytes)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod test {
    use super::*;
    use crate::node::{ExtensionNode, LeafNode};

    fn leaf(value: &[u8]) -> Node {
        LeafNode::new(value).unwrap().into()
    }

    fn extension(key: &[u8], next: Node) -> Node {
        ExtensionNode::new(Path::from(key), next).unwrap().into()
    }

    /// A two-level trie holding "value" under [0xab, 0xcd] and "other"
    /// under [0xab, 0xed], hydrated entirely through hash references.
    fn sample() -> (TrieHash, Vec<Vec<u8>>) {
        let mut branch = BranchNode::new();
        branch.children[0xc] = extension(&[0xd], leaf(b"value"));
        branch.children[0xe] = extension(&[0xd], leaf(b"other"));
        let root = extension(&[0xa, 0xb], Node::from(branch));

        let mut proof = vec![root.encode_without_reference()];
        if let Node::Extension(ext) = &root {
            proof.push(ext.next.encode_without_reference());
            if let Node::Branch(branch) = &ext.next {
                for child in &branch.children {
                    if let Node::Extension(sub) = child {
                        proof.push(child.encode_without_reference());
                        proof.push(sub.next.encode_without_reference());
                    }
                }
            }
        }
        (root.hash(), proof)
    }

    fn trie_over(root_hash: TrieHash, proof: &[Vec<u8>]) -> Trie {
        Trie::from_root_hash(root_hash, ProofDb::new(proof))
    }

    #[test]
    fn resolves_values_through_hash_references() {
        let (root_hash, proof) = sample();
        let trie = trie_over(root_hash, &proof);
        assert_eq!(trie.get(&[0xab, 0xcd]).unwrap().as_deref(), Some(&b"value"[..]));
        assert_eq!(trie.get(&[0xab, 0xed]).unwrap().as_deref(), Some(&b"other"[..]));
    }

    #[test]
    fn absent_keys_are_none_not_errors() {
        let (root_hash, proof) = sample();
        let trie = trie_over(root_hash, &proof);
        // Diverges inside the branch: slot 0xf is empty.
        assert_eq!(trie.get(&[0xab, 0xfd]).unwrap(), None);
        // Diverges on the root extension prefix.
        assert_eq!(trie.get(&[0xcd, 0xcd]).unwrap(), None);
        // Leftover path below a leaf.
        assert_eq!(trie.get(&[0xab, 0xcd, 0x01]).unwrap(), None);
        // Path exhausted at the branch, whose value child is empty.
        assert_eq!(trie.get(&[0xab]).unwrap(), None);
    }

    #[test]
    fn missing_entries_surface_the_wanted_hash() {
        let (root_hash, mut proof) = sample();
        // Drop the terminal leaf for [0xab, 0xcd].
        let leaf_bytes = leaf(b"value").encode_without_reference();
        proof.retain(|entry| *entry != leaf_bytes);
        let trie = trie_over(root_hash, &proof);

        let wanted = leaf(b"value").hash();
        assert_eq!(
            trie.get(&[0xab, 0xcd]).unwrap_err(),
            TrieError::ProofIncomplete(wanted)
        );
        // The sibling path is still fully proven.
        assert_eq!(trie.get(&[0xab, 0xed]).unwrap().as_deref(), Some(&b"other"[..]));
    }

    #[test]
    fn empty_root_holds_nothing() {
        let trie = Trie::new(Node::Empty, ProofDb::default());
        assert_eq!(trie.get(b"anything").unwrap(), None);
        assert_eq!(trie.get(b"").unwrap(), None);
    }

    #[test]
    fn branch_value_child_is_reached_by_an_exhausted_path() {
        let mut branch = BranchNode::new();
        branch.children[BranchNode::VALUE_CHILD] = leaf(b"at-branch");
        let trie = Trie::new(branch.into(), ProofDb::default());
        assert_eq!(trie.get(&[]).unwrap().as_deref(), Some(&b"at-branch"[..]));
    }

    #[test]
    fn proof_order_never_matters() {
        let (root_hash, mut proof) = sample();
        let forward = trie_over(root_hash, &proof).get(&[0xab, 0xcd]).unwrap();
        proof.reverse();
        let reversed = trie_over(root_hash, &proof).get(&[0xab, 0xcd]).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn undecodable_entries_are_decode_errors() {
        // The root hash commits to a garbage entry, which the store still
        // serves (it hashes correctly) but decode rejects.
        let garbage = b"\x05not-a-node".to_vec();
        let root_hash = crate::hash256(&garbage);
        let trie = trie_over(root_hash, &[garbage]);
        assert!(matches!(
            trie.get(&[0x00]).unwrap_err(),
            TrieError::Decode(DecodeError::UnknownTag(0x05))
        ));
    }
}
