//! Commit-Reveal Proofs
//!
//! Binding a secret move to a public digest and checking reveals against it.

pub mod commitment;

// Re-export key types
pub use commitment::{Commitment, CommitmentError, Nonce, verify, DEFAULT_MAX_NONCE_LEN};
