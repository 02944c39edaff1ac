//! Domain-Separated Hashing
//!
//! SHA-256 helpers for commitment digests.
//! Every digest starts with a domain tag so values from one context
//! can never be mistaken for values from another.

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type DigestBytes = [u8; 32];

/// Domain tag for move commitments.
pub const COMMITMENT_DOMAIN: &[u8] = b"RPS_ARENA_COMMIT_V1";

/// Incremental hasher with a leading domain separator.
///
/// Order of updates is part of the digest format.
pub struct DomainHasher {
    hasher: Sha256,
}

impl DomainHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for move commitments.
    pub fn for_commitment() -> Self {
        Self::new(COMMITMENT_DOMAIN)
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed byte string.
    ///
    /// The prefix is a u64 so no input length can wrap it.
    #[inline]
    pub fn update_prefixed(&mut self, bytes: &[u8]) {
        self.update_u64(bytes.len() as u64);
        self.hasher.update(bytes);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> DigestBytes {
        self.hasher.finalize().into()
    }
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> DigestBytes {
    let mut hasher = DomainHasher::new(domain);
    hasher.update_bytes(data);
    hasher.finalize()
}
