// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! End-to-end proof verification over a hand-built contract-storage trie.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use stateproof::{
    BranchNode, ExtensionNode, LeafNode, Node, Path, ProofError, ProofLimits, ScriptHash,
    StorageItem, StorageKey, TrieError, TrieHash, encode_proof_blob, hash256, resolve_proof_blob,
    verify_proof, verify_proof_blob,
};

const VALUE: &[u8] = b"\x01\x02balance=1000";

fn storage_key() -> StorageKey {
    StorageKey::new(ScriptHash::from([0x77; 20]), b"balance")
}

/// Builds a root hash and proof set for one storage entry, shaped like a
/// real state trie: an extension into a branch, a sibling leaf hanging off
/// the branch, and an extension down to the target leaf.
fn build_proof(storage_key: &StorageKey, leaf_value: &[u8]) -> (TrieHash, Vec<Vec<u8>>) {
    let path = Path::from_key(&storage_key.encode());

    let leaf = Node::from(LeafNode::new(leaf_value).unwrap());
    let tail = Node::from(ExtensionNode::new(Path::from(&path[11..]), leaf.clone()).unwrap());

    let mut branch = BranchNode::new();
    branch.children[usize::from(path[10])] = tail.clone();
    let sibling_slot = (usize::from(path[10]) + 1) % 16;
    branch.children[sibling_slot] = Node::from(LeafNode::new(b"sibling").unwrap());
    let branch = Node::from(branch);

    let head = Node::from(ExtensionNode::new(Path::from(&path[..10]), branch.clone()).unwrap());

    // Proof entries are the hash preimages: the without-reference
    // serializations. The sibling leaf is referenced by the branch but
    // deliberately not included; it is off the access path.
    let proof = vec![
        head.encode_without_reference(),
        branch.encode_without_reference(),
        tail.encode_without_reference(),
        leaf.encode_without_reference(),
    ];
    (head.hash(), proof)
}

fn wrapped(value: &[u8]) -> Vec<u8> {
    StorageItem::new(value).encode()
}

#[test]
fn resolves_the_proven_value() {
    let key = storage_key();
    let (root, proof) = build_proof(&key, &wrapped(VALUE));
    let value = verify_proof(root, key.script_hash, &key.key, &proof).unwrap();
    assert_eq!(&*value, VALUE);
}

#[test]
fn proof_order_and_duplicates_never_matter() {
    let key = storage_key();
    let (root, mut proof) = build_proof(&key, &wrapped(VALUE));

    proof.reverse();
    let reversed = verify_proof(root, key.script_hash, &key.key, &proof).unwrap();
    assert_eq!(&*reversed, VALUE);

    proof.push(proof[0].clone());
    let duplicated = verify_proof(root, key.script_hash, &key.key, &proof).unwrap();
    assert_eq!(&*duplicated, VALUE);
}

#[test]
fn flipping_any_byte_anywhere_breaks_the_proof() {
    let key = storage_key();
    let (root, proof) = build_proof(&key, &wrapped(VALUE));

    for entry in 0..proof.len() {
        for position in 0..proof[entry].len() {
            let mut tampered = proof.clone();
            tampered[entry][position] ^= 0xff;
            let result = verify_proof(root, key.script_hash, &key.key, &tampered);
            // The tampered entry no longer hashes to what its parent
            // expects, so the chain must report it missing; it must never
            // produce a different accepted value.
            assert!(
                matches!(result, Err(ProofError::Trie(TrieError::ProofIncomplete(_)))),
                "entry {entry} byte {position}: got {result:?}"
            );
        }
    }
}

#[test]
fn dropping_any_entry_breaks_the_proof() {
    let key = storage_key();
    let (root, proof) = build_proof(&key, &wrapped(VALUE));

    for missing in 0..proof.len() {
        let mut partial = proof.clone();
        partial.remove(missing);
        let result = verify_proof(root, key.script_hash, &key.key, &partial);
        assert!(
            matches!(result, Err(ProofError::Trie(TrieError::ProofIncomplete(_)))),
            "without entry {missing}: got {result:?}"
        );
    }
}

#[test]
fn an_untrusted_root_rejects_everything() {
    let key = storage_key();
    let (_, proof) = build_proof(&key, &wrapped(VALUE));
    let bogus = hash256(b"not the state root");
    assert!(matches!(
        verify_proof(bogus, key.script_hash, &key.key, &proof),
        Err(ProofError::Trie(TrieError::ProofIncomplete(_)))
    ));
}

#[test]
fn unproven_keys_are_not_found() {
    let key = storage_key();
    let (root, proof) = build_proof(&key, &wrapped(VALUE));

    // Same contract, different key: diverges inside the tail extension.
    assert_eq!(
        verify_proof(root, key.script_hash, b"balanceX", &proof),
        Err(ProofError::KeyNotFound)
    );

    // Different contract: diverges on the head extension.
    assert_eq!(
        verify_proof(root, ScriptHash::from([0x78; 20]), &key.key, &proof),
        Err(ProofError::KeyNotFound)
    );
}

#[test]
fn values_must_be_storage_item_envelopes() {
    let key = storage_key();
    // A leaf whose value is a truncated envelope: claims 255 bytes.
    let (root, proof) = build_proof(&key, &[0xff]);
    assert!(matches!(
        verify_proof(root, key.script_hash, &key.key, &proof),
        Err(ProofError::Value(_))
    ));
}

#[test]
fn blob_packing_round_trips_through_verification() {
    let key = storage_key();
    let (root, proof) = build_proof(&key, &wrapped(VALUE));

    let blob = encode_proof_blob(&key, &proof);
    let resolved = resolve_proof_blob(&blob, &ProofLimits::default()).unwrap();
    assert_eq!(resolved.storage_key, key);
    assert_eq!(resolved.nodes.len(), proof.len());

    let value = verify_proof_blob(root, &blob, &ProofLimits::default()).unwrap();
    assert_eq!(&*value, VALUE);
}
