//! Identifiers
//!
//! Participant addresses and match ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Match identifier. Allocated sequentially from 0, never reused.
pub type MatchId = u64;

/// Length of a participant address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Participant identity (20-byte account address).
///
/// Implements Ord for deterministic BTreeMap ordering.
/// Serialized as a lowercase `0x`-prefixed hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParticipantId(pub [u8; ADDRESS_LEN]);

/// Address parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid participant address: {0:?}")]
pub struct InvalidAddress(pub String);

impl ParticipantId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from hex, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, InvalidAddress> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| InvalidAddress(s.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(InvalidAddress(s.to_string()));
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Lowercase `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({})", self.to_hex())
    }
}

impl FromStr for ParticipantId {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    #[test]
    fn test_parse_and_display() {
        let id = ParticipantId::from_hex(ALICE).unwrap();
        assert_eq!(id.to_string(), ALICE);
        assert_eq!(id.as_bytes()[0], 0x70);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let upper = "0x70997970C51812DC3A010C7D01B50E0D17DC79C8";
        let id: ParticipantId = upper.parse().unwrap();
        assert_eq!(id.to_hex(), ALICE);

        let bare: ParticipantId = ALICE.trim_start_matches("0x").parse().unwrap();
        assert_eq!(bare, id);
    }

    #[test]
    fn test_rejects_bad_addresses() {
        assert!(ParticipantId::from_hex("").is_err());
        assert!(ParticipantId::from_hex("0x1234").is_err());
        assert!(ParticipantId::from_hex("0xzz997970c51812dc3a010c7d01b50e0d17dc79c8").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = ParticipantId::from_hex(ALICE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", ALICE));

        let back: ParticipantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ParticipantId>("\"0x12\"").is_err());
    }
}
