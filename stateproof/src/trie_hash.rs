// Copyright (C) 2023, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

use std::fmt::{self, Debug, Display};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// A hash value identifying a node inside a merkle trie.
///
/// Node hashes are SHA-256 applied twice to the node's serialization without
/// its reference count, so a `TrieHash` commits to the node's content and
/// nothing else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TrieHash([u8; 32]);

/// Returned when constructing a [`TrieHash`] from a slice of the wrong length.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {} hash bytes, found {found}", TrieHash::LEN)]
pub struct InvalidTrieHashLength {
    /// The length of the rejected input.
    pub found: usize,
}

impl TrieHash {
    /// The length of a [`TrieHash`] in bytes.
    pub const LEN: usize = 32;
}

impl std::ops::Deref for TrieHash {
    type Target = [u8; 32];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for TrieHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for TrieHash {
    fn from(value: [u8; Self::LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for TrieHash {
    type Error = InvalidTrieHashLength;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        <[u8; Self::LEN]>::try_from(value)
            .map(Self)
            .map_err(|_| InvalidTrieHashLength { found: value.len() })
    }
}

impl Debug for TrieHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Display for TrieHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Double SHA-256 of `data`.
#[must_use]
pub fn hash256(data: &[u8]) -> TrieHash {
    let first = Sha256::digest(data);
    TrieHash(Sha256::digest(first).into())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn hash256_is_double_sha256() {
        // SHA-256 applied twice to the empty input.
        assert_eq!(
            *hash256(&[]),
            hex!("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
        );
    }

    #[test]
    fn slice_conversion_checks_length() {
        let bytes = [0xabu8; 32];
        assert_eq!(TrieHash::try_from(&bytes[..]), Ok(TrieHash::from(bytes)));
        assert_eq!(
            TrieHash::try_from(&bytes[..31]),
            Err(InvalidTrieHashLength { found: 31 })
        );
    }

    #[test]
    fn renders_as_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xde;
        bytes[31] = 0xad;
        let rendered = format!("{:?}", TrieHash::from(bytes));
        assert!(rendered.starts_with("de00"));
        assert!(rendered.ends_with("ad"));
    }
}
