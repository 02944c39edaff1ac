//! Game Logic Module
//!
//! Commit-reveal match rules. Synchronous and free of I/O.
//!
//! ## Module Structure
//!
//! - `moves`: Moves, beats relation, winner rule
//! - `state`: Single-match state machine
//! - `registry`: Live matches and the one-match-per-participant index
//! - `events`: State changes for outward notices

pub mod moves;
pub mod state;
pub mod registry;
pub mod events;

// Re-export key types
pub use moves::{Move, Outcome, InvalidMoveCode};
pub use state::{Match, MatchPhase, MatchError, MatchSummary, RevealOutcome};
pub use registry::{Registry, RegistryError};
pub use events::ArenaEvent;
