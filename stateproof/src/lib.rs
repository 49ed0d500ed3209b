// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]
#![deny(unsafe_code)]

//! # stateproof verifies contract-storage values against a trusted state root
//!
//! The crate reconstructs just enough of a Merkle–Patricia trie from an
//! untrusted set of serialized nodes (a "proof") to resolve one key to one
//! value. Every node on the resolved path is looked up by its own content
//! hash, so a proof supplier cannot substitute or forge a node without the
//! lookup failing.
//!
//! The only trusted input is the 32-byte root hash; everything else — the
//! proof nodes, the contract script hash, the storage key — is verified,
//! not believed.
//!
//! Typical use from an RPC layer:
//!
//! ```
//! use stateproof::{ProofLimits, resolve_proof_blob, verify_proof};
//!
//! # fn demo(root: stateproof::TrieHash, blob: &[u8]) -> Result<(), stateproof::ProofError> {
//! let resolved = resolve_proof_blob(blob, &ProofLimits::default())?;
//! let value = verify_proof(
//!     root,
//!     resolved.storage_key.script_hash,
//!     &resolved.storage_key.key,
//!     &resolved.nodes,
//! )?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

mod codec;
mod config;
mod node;
mod path;
mod proof;
mod proofdb;
mod storage_key;
mod trie;
mod trie_hash;

/// Logger module for handling logging functionality
pub mod logger;

pub use codec::{ByteReader, ByteWriter, CodecError};
pub use config::ProofLimits;
pub use node::{BranchNode, DecodeError, ExtensionNode, LeafNode, Node};
pub use path::{NibblesIterator, Path};
pub use proof::{
    ProofError, ResolvedProof, encode_proof_blob, resolve_proof_blob, verify_proof,
    verify_proof_blob,
};
pub use proofdb::ProofDb;
pub use storage_key::{
    InvalidScriptHashLength, ScriptHash, StorageItem, StorageKey, StorageKeyError,
};
pub use trie::{Trie, TrieError};
pub use trie_hash::{InvalidTrieHashLength, TrieHash, hash256};
