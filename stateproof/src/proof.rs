// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! Verification of contract-storage proofs against a trusted root hash.
//!
//! The root hash is the only trusted input here. The proof nodes, the
//! script hash, and the key all come from an untrusted source and are
//! checked by walking the hash chain from the root down to the value.

use thiserror::Error;

use metrics::counter;

use crate::codec::{ByteReader, ByteWriter, CodecError};
use crate::logger::debug;
use crate::storage_key::{ScriptHash, StorageItem, StorageKey, StorageKeyError};
use crate::{ProofDb, ProofLimits, Trie, TrieError, TrieHash};

/// An error produced while resolving or verifying a storage proof.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    /// The trie walk failed: a proof entry was malformed or missing.
    #[error(transparent)]
    Trie(#[from] TrieError),
    /// The proven trie holds no value for the requested key. Distinct from
    /// an incomplete proof: the path itself was fully proven.
    #[error("the proven trie holds no value for the requested key")]
    KeyNotFound,
    /// The proof blob packing was malformed.
    #[error("malformed proof blob: {0}")]
    Blob(#[source] CodecError),
    /// The storage key inside a proof blob was malformed.
    #[error("malformed storage key: {0}")]
    StorageKey(#[from] StorageKeyError),
    /// The resolved value was not a valid storage-item envelope.
    #[error("malformed storage item: {0}")]
    Value(#[source] CodecError),
}

/// The parts packed inside a proof blob.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedProof {
    /// The storage key the proof claims to prove.
    pub storage_key: StorageKey,
    /// The serialized trie nodes, in the order they were packed.
    pub nodes: Vec<Box<[u8]>>,
}

/// Verifies that `key` under `script_hash` resolves to a value in the trie
/// with the trusted `root` hash, using only nodes supplied in `proof`.
///
/// Returns the unwrapped value bytes. `root` must come from an
/// independently trusted source (typically a state-root header); everything
/// else may be attacker controlled and at worst yields a typed error.
///
/// # Errors
///
/// - [`ProofError::Trie`] when the proof set is insufficient or malformed.
/// - [`ProofError::KeyNotFound`] when the proven trie holds no value.
/// - [`ProofError::Value`] when the stored bytes are not a storage item.
pub fn verify_proof<I>(
    root: TrieHash,
    script_hash: ScriptHash,
    key: &[u8],
    proof: I,
) -> Result<Box<[u8]>, ProofError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let trie = Trie::from_root_hash(root, ProofDb::new(proof));
    let path = StorageKey::new(script_hash, key).encode();

    let result = match trie.get(&path) {
        Ok(Some(raw)) => StorageItem::decode(&raw)
            .map(|item| item.value)
            .map_err(ProofError::Value),
        Ok(None) => Err(ProofError::KeyNotFound),
        Err(err) => Err(ProofError::Trie(err)),
    };

    match &result {
        Ok(value) => {
            counter!("stateproof.verify", "result" => "ok").increment(1);
            debug!("proof for {script_hash} verified, {} value bytes", value.len());
        }
        Err(err) => {
            counter!("stateproof.verify", "result" => "failed").increment(1);
            debug!("proof for {script_hash} rejected: {err}");
        }
    }
    result
}

/// Unpacks a proof blob into its storage key and node list.
///
/// The packing is a var-bytes storage-key field, a var-uint node count,
/// then that many var-bytes node entries. Every length is checked against
/// `limits` before it is honored, and the blob must be fully consumed.
pub fn resolve_proof_blob(blob: &[u8], limits: &ProofLimits) -> Result<ResolvedProof, ProofError> {
    let mut reader = ByteReader::new(blob);

    let key_bytes = reader
        .read_var_bytes(limits.max_element_size)
        .map_err(ProofError::Blob)?;
    let storage_key = StorageKey::decode(key_bytes)?;

    let count = reader
        .read_var_uint(limits.max_nodes)
        .map_err(ProofError::Blob)?;
    let mut nodes = Vec::new();
    for _ in 0..count {
        let node = reader
            .read_var_bytes(limits.max_element_size)
            .map_err(ProofError::Blob)?;
        nodes.push(node.into());
    }
    reader.expect_eof().map_err(ProofError::Blob)?;

    Ok(ResolvedProof { storage_key, nodes })
}

/// Packs a storage key and its proof nodes into a blob, the inverse of
/// [`resolve_proof_blob`].
pub fn encode_proof_blob<I>(storage_key: &StorageKey, nodes: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut writer = ByteWriter::new();
    writer.write_var_bytes(&storage_key.encode());
    let mut body = ByteWriter::new();
    let mut count: u64 = 0;
    for node in nodes {
        body.write_var_bytes(node.as_ref());
        count += 1;
    }
    writer.write_var_uint(count);
    writer.write_bytes(&body.into_vec());
    writer.into_vec()
}

/// Unpacks `blob` and verifies it against the trusted `root` in one step —
/// the shape of the call an RPC layer makes with a fetched proof.
pub fn verify_proof_blob(
    root: TrieHash,
    blob: &[u8],
    limits: &ProofLimits,
) -> Result<Box<[u8]>, ProofError> {
    let resolved = resolve_proof_blob(blob, limits)?;
    verify_proof(
        root,
        resolved.storage_key.script_hash,
        &resolved.storage_key.key,
        &resolved.nodes,
    )
}
