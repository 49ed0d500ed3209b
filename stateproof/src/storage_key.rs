// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! The storage-key and storage-item wire formats.
//!
//! A storage key is addressed by a 20-byte contract script hash followed by
//! the key bytes in a length-preserving block-grouping form: every block is
//! 16 data bytes plus one padding-count byte. Full data blocks carry a
//! padding count of 0; the final block is zero-padded and records how many
//! padding bytes were added (16 means the key ended exactly on a block
//! boundary). Decoding stops at the first block with a non-zero padding
//! count, so keys of any length round-trip without a length prefix.

use std::fmt::{self, Debug, Display};

use thiserror::Error;

use crate::codec::{ByteReader, ByteWriter, CodecError};

/// The number of data bytes in one storage-key group.
const GROUP_SIZE: usize = 16;

/// Returned when constructing a [`ScriptHash`] from a slice of the wrong
/// length.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {} script hash bytes, found {found}", ScriptHash::LEN)]
pub struct InvalidScriptHashLength {
    /// The length of the rejected input.
    pub found: usize,
}

/// An error produced while decoding a storage key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageKeyError {
    /// The underlying byte format was malformed or truncated.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A grouping block claimed more padding than a block holds.
    #[error("group padding count {0} exceeds the group size")]
    InvalidPadding(u8),
}

/// The 20-byte hash identifying a contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScriptHash([u8; 20]);

impl ScriptHash {
    /// The length of a [`ScriptHash`] in bytes.
    pub const LEN: usize = 20;
}

impl std::ops::Deref for ScriptHash {
    type Target = [u8; 20];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for ScriptHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for ScriptHash {
    fn from(value: [u8; Self::LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for ScriptHash {
    type Error = InvalidScriptHashLength;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        <[u8; Self::LEN]>::try_from(value)
            .map(Self)
            .map_err(|_| InvalidScriptHashLength { found: value.len() })
    }
}

impl Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The address of one piece of contract storage.
///
/// Its encoding, expanded to nibbles, is the lookup path fed into the trie
/// resolver.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StorageKey {
    /// The owning contract.
    pub script_hash: ScriptHash,
    /// The key bytes within that contract's storage.
    pub key: Box<[u8]>,
}

impl StorageKey {
    /// Creates a storage key for `key` under `script_hash`.
    pub fn new(script_hash: ScriptHash, key: impl AsRef<[u8]>) -> Self {
        Self {
            script_hash,
            key: key.as_ref().into(),
        }
    }

    /// Serializes the key: raw script hash, then the block-grouped key.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_bytes(self.script_hash.as_ref());
        write_grouped(&mut writer, &self.key);
        writer.into_vec()
    }

    /// Decodes a serialized storage key, which must span all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageKeyError> {
        let mut reader = ByteReader::new(bytes);
        let script_hash = ScriptHash::from(reader.read_array()?);
        let key = read_grouped(&mut reader)?;
        reader.expect_eof()?;
        Ok(Self {
            script_hash,
            key: key.into(),
        })
    }
}

/// The envelope wrapped around every stored value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StorageItem {
    /// The caller-visible value bytes.
    pub value: Box<[u8]>,
}

impl StorageItem {
    /// Wraps `value` in a storage item.
    pub fn new(value: impl AsRef<[u8]>) -> Self {
        Self {
            value: value.as_ref().into(),
        }
    }

    /// Serializes the item as a var-bytes blob.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_var_bytes(&self.value);
        writer.into_vec()
    }

    /// Decodes an item, which must span all of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let value = reader.read_var_bytes(bytes.len())?;
        reader.expect_eof()?;
        Ok(Self {
            value: value.into(),
        })
    }
}

fn write_grouped(writer: &mut ByteWriter, value: &[u8]) {
    let mut chunks = value.chunks_exact(GROUP_SIZE);
    for chunk in &mut chunks {
        writer.write_bytes(chunk);
        writer.write_u8(0);
    }
    let tail = chunks.remainder();
    let padding = GROUP_SIZE - tail.len();
    writer.write_bytes(tail);
    for _ in 0..padding {
        writer.write_u8(0);
    }
    #[allow(clippy::cast_possible_truncation, reason = "padding is at most the group size")]
    writer.write_u8(padding as u8);
}

fn read_grouped(reader: &mut ByteReader<'_>) -> Result<Vec<u8>, StorageKeyError> {
    let mut out = Vec::new();
    loop {
        let group: [u8; GROUP_SIZE] = reader.read_array()?;
        let padding = reader.read_u8()?;
        let Some(kept) = GROUP_SIZE.checked_sub(usize::from(padding)) else {
            return Err(StorageKeyError::InvalidPadding(padding));
        };
        #[allow(clippy::indexing_slicing, reason = "kept is at most the group size")]
        out.extend_from_slice(&group[..kept]);
        if padding != 0 {
            return Ok(out);
        }
    }
}
