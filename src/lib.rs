//! # RPS Arena
//!
//! Commit-reveal Rock-Paper-Scissors for adversarial, append-only message logs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RPS ARENA                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── ids.rs      - Participant addresses, match ids          │
//! │  └── hash.rs     - Domain-separated SHA-256                  │
//! │                                                              │
//! │  proof/          - Commit-reveal                             │
//! │  └── commitment.rs - Digest, nonce, constant-time verify     │
//! │                                                              │
//! │  game/           - Match rules (synchronous, no I/O)         │
//! │  ├── moves.rs    - Moves and the winner rule                 │
//! │  ├── state.rs    - Match state machine                       │
//! │  ├── registry.rs - Live matches, participant index           │
//! │  └── events.rs   - State changes for notices                 │
//! │                                                              │
//! │  network/        - Host interface                            │
//! │  ├── protocol.rs - JSON request/response shapes              │
//! │  ├── dispatch.rs - Method routing behind one lock            │
//! │  └── server.rs   - Line-oriented driver                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! A move is only accepted if it matches the commitment its sender published
//! before the opponent's move was visible. Commitments are bound to the
//! committing participant, so a copied commitment cannot be revealed by
//! anyone else.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod proof;

// Re-export commonly used types
pub use crate::core::ids::{MatchId, ParticipantId};
pub use crate::game::moves::{Move, Outcome};
pub use crate::game::registry::{Registry, RegistryError};
pub use crate::game::state::{Match, MatchError, MatchPhase};
pub use crate::proof::commitment::{Commitment, Nonce};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
