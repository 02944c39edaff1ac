//! Move Commitment Protocol
//!
//! Commit to a move before the opponent's move is known.
//! Reveal the move and nonce later; anyone can check the pair against
//! the published digest.
//!
//! ```
//! use rps_arena::core::ids::ParticipantId;
//! use rps_arena::game::moves::Move;
//! use rps_arena::proof::commitment::{Commitment, Nonce};
//!
//! let alice = ParticipantId::new([1; 20]);
//! let nonce = Nonce::new(b"correct horse".to_vec()).unwrap();
//! let commitment = Commitment::compute(&alice, Move::Rock, &nonce);
//!
//! assert!(commitment.verify(&alice, Move::Rock, &nonce));
//! assert!(!commitment.verify(&alice, Move::Paper, &nonce));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::hash::{DigestBytes, DomainHasher};
use crate::core::ids::ParticipantId;
use crate::game::moves::Move;

/// Default upper bound on nonce length in bytes.
pub const DEFAULT_MAX_NONCE_LEN: usize = 256;

/// Malformed commitment input.
///
/// Distinct from a failed verification: these mean the caller sent
/// something that cannot be checked at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    /// Nonce has no bytes.
    #[error("nonce must not be empty")]
    EmptyNonce,

    /// Nonce exceeds the configured limit.
    #[error("nonce is {len} bytes, limit is {max}")]
    NonceTooLong {
        /// Supplied length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Commitment is not 32 bytes of hex.
    #[error("malformed commitment {0:?}: expected 32 bytes of hex")]
    MalformedCommitment(String),
}

/// Secret nonce mixed into a commitment.
#[derive(Clone, PartialEq, Eq)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// Wrap nonce bytes. Rejects empty input.
    pub fn new(bytes: Vec<u8>) -> Result<Self, CommitmentError> {
        if bytes.is_empty() {
            return Err(CommitmentError::EmptyNonce);
        }
        Ok(Self(bytes))
    }

    /// Wrap nonce bytes, also enforcing a length limit.
    pub fn with_limit(bytes: Vec<u8>, max: usize) -> Result<Self, CommitmentError> {
        if bytes.len() > max {
            return Err(CommitmentError::NonceTooLong { len: bytes.len(), max });
        }
        Self::new(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Nonces are secrets until revealed; keep them out of logs.
impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({} bytes)", self.0.len())
    }
}

/// Published commitment digest.
///
/// Immutable once stored in a match.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(DigestBytes);

impl Commitment {
    /// Wrap an existing digest.
    pub const fn from_bytes(bytes: DigestBytes) -> Self {
        Self(bytes)
    }

    /// Parse from hex, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CommitmentError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|_| CommitmentError::MalformedCommitment(s.to_string()))?;
        let digest: DigestBytes = bytes
            .try_into()
            .map_err(|_| CommitmentError::MalformedCommitment(s.to_string()))?;
        Ok(Self(digest))
    }

    /// Compute the commitment for a move.
    ///
    /// Digest layout: domain tag, participant address, move code,
    /// length-prefixed nonce.
    pub fn compute(participant: &ParticipantId, mv: Move, nonce: &Nonce) -> Self {
        let mut hasher = DomainHasher::for_commitment();
        hasher.update_bytes(participant.as_bytes());
        hasher.update_u8(mv.code());
        hasher.update_prefixed(nonce.as_bytes());
        Self(hasher.finalize())
    }

    /// Check a disclosed move and nonce against this commitment.
    ///
    /// Comparison is constant-time.
    pub fn verify(&self, participant: &ParticipantId, mv: Move, nonce: &Nonce) -> bool {
        let expected = Self::compute(participant, mv, nonce);
        self.0[..].ct_eq(&expected.0[..]).into()
    }

    /// Raw digest.
    pub fn as_bytes(&self) -> &DigestBytes {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Free-function form of [`Commitment::verify`].
pub fn verify(commitment: &Commitment, participant: &ParticipantId, mv: Move, nonce: &Nonce) -> bool {
    commitment.verify(participant, mv, nonce)
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for Commitment {
    type Err = CommitmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
