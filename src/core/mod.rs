//! Core primitives.
//!
//! Identifiers and domain-separated hashing shared by the game and proof layers.

pub mod hash;
pub mod ids;

// Re-export core types
pub use hash::{DigestBytes, DomainHasher};
pub use ids::{MatchId, ParticipantId, InvalidAddress};
