//! Identifiers for accounts, asset contracts, and the engine operator.
//!
//! An [`Id`] is raw bytes plus the text encoding it was parsed from, so
//! identifiers round-trip through display and JSON in their original form.
//! Equality, ordering, and hashing consider the bytes only.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::IdentityError;

/// Text encodings an [`Id`] can be parsed from and displayed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `0x`-prefixed hexadecimal.
    Hex,
    /// Base58 (no prefix).
    Base58,
    /// Standard base64.
    Base64,
}

/// An account, contract, or operator identifier.
#[derive(Debug, Clone)]
pub struct Id {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl Id {
    /// Builds an identifier from raw bytes, displayed with `encoding`.
    pub fn from_bytes(bytes: Vec<u8>, encoding: Encoding) -> Self {
        Self { bytes, encoding }
    }

    /// Parses a hex identifier; a leading `0x` is optional here.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self {
            bytes: hex::decode(digits)?,
            encoding: Encoding::Hex,
        })
    }

    /// Parses a base58 identifier.
    pub fn from_base58(s: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            bytes: bs58::decode(s).into_vec()?,
            encoding: Encoding::Base58,
        })
    }

    /// Parses a standard-base64 identifier.
    pub fn from_base64(s: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            bytes: BASE64.decode(s)?,
            encoding: Encoding::Base64,
        })
    }

    /// Raw identity bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True for the empty (null) identifier.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Canonical SHA-256 digest of the identity bytes.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(&self.bytes).into()
    }
}

impl FromStr for Id {
    type Err = IdentityError;

    /// Parses an identifier, trying `0x`-hex, then base58, then base64.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdentityError::EmptyIdentity);
        }
        if s.starts_with("0x") {
            return Self::from_hex(s);
        }
        if let Ok(id) = Self::from_base58(s) {
            return Ok(id);
        }
        if let Ok(id) = Self::from_base64(s) {
            return Ok(id);
        }
        Err(IdentityError::UnsupportedFormat)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            Encoding::Hex => write!(f, "0x{}", hex::encode(&self.bytes)),
            Encoding::Base58 => write!(f, "{}", bs58::encode(&self.bytes).into_string()),
            Encoding::Base64 => write!(f, "{}", BASE64.encode(&self.bytes)),
        }
    }
}

// The encoding is display metadata; two identifiers with the same bytes
// are the same party.
impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

// String-form serde so identifiers are usable as JSON map keys.
impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        for text in [
            "0xd8da6bf26964af9d7eed9e03e53415d37aa96045",
            "3yZe7d",
            "aGVsbG8=",
        ] {
            let id = Id::from_str(text).unwrap();
            assert_eq!(id.to_string(), text);
        }
    }

    #[test]
    fn equality_ignores_encoding() {
        let hex = Id::from_hex("0xdeadbeef").unwrap();
        let b58 = Id::from_base58(&bs58::encode(hex.as_bytes()).into_string()).unwrap();
        assert_eq!(hex, b58);
        assert_eq!(hex.digest(), b58.digest());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(Id::from_str(""), Err(IdentityError::EmptyIdentity));
        // '!' is outside every supported alphabet
        assert_eq!(Id::from_str("!!!"), Err(IdentityError::UnsupportedFormat));
        assert!(matches!(Id::from_str("0xzz"), Err(IdentityError::Hex(_))));
    }

    #[test]
    fn json_string_form() {
        let id = Id::from_hex("0xdeadbeef").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0xdeadbeef\"");
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
