//! Match State
//!
//! One challenge between two participants, from the creator's commitment
//! to the second reveal. Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::ids::{MatchId, ParticipantId};
use crate::game::moves::{decide, Move, Outcome};
use crate::proof::commitment::{Commitment, Nonce};

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Match lifecycle phase.
///
/// Derived from the stored commitments and reveals, so a match can only
/// move forward one phase at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Creator committed, waiting for an opponent.
    Open,
    /// Both committed, nobody revealed.
    Active,
    /// One reveal received.
    PartiallyRevealed,
    /// Both revealed, outcome computed.
    Resolved,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Rejections raised by a single match.
///
/// None of these leave the match modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Opponent slot already taken.
    #[error("challenge already has two participants")]
    AlreadyFull,

    /// Creator tried to accept their own challenge.
    #[error("cannot accept your own challenge")]
    SelfChallenge,

    /// Revealer is not part of this match.
    #[error("participant is not part of this challenge")]
    UnknownParticipant,

    /// Reveal before the opponent committed.
    #[error("challenge has not been accepted yet")]
    NotYetActive,

    /// Second reveal from the same participant.
    #[error("move already revealed")]
    AlreadyRevealed,

    /// Revealed move and nonce do not match the commitment.
    #[error("revealed move does not match commitment")]
    CommitmentMismatch,
}

// =============================================================================
// REVEAL OUTCOME
// =============================================================================

/// Result of an accepted reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    /// Match the reveal applied to.
    pub match_id: MatchId,
    /// Who revealed.
    pub participant: ParticipantId,
    /// The verified move.
    pub revealed: Move,
    /// Set when this reveal resolved the match.
    pub outcome: Option<Outcome>,
}

impl RevealOutcome {
    /// True if the match is now resolved.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }
}

// =============================================================================
// MATCH SUMMARY
// =============================================================================

/// Read-only snapshot of a match.
///
/// Never contains an unrevealed move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Match identifier.
    pub challenge_id: MatchId,
    /// Current phase.
    pub phase: MatchPhase,
    /// Participant who opened the challenge.
    pub creator: ParticipantId,
    /// Participant who accepted, if any.
    pub opponent: Option<ParticipantId>,
    /// Whether the opponent has committed.
    pub opponent_committed: bool,
    /// Creator's commitment.
    pub creator_commitment: Option<Commitment>,
    /// Opponent's commitment, if any.
    pub opponent_commitment: Option<Commitment>,
    /// Creator's revealed move.
    pub creator_move: Option<Move>,
    /// Opponent's revealed move.
    pub opponent_move: Option<Move>,
    /// Winner, once resolved and not a draw.
    pub winner: Option<ParticipantId>,
    /// True once resolved as a draw.
    pub draw: bool,
}

// =============================================================================
// MATCH
// =============================================================================

/// A two-participant commit-reveal match.
///
/// Only built through `create`.
#[derive(Clone, Debug)]
pub struct Match {
    id: MatchId,
    creator: ParticipantId,
    opponent: Option<ParticipantId>,
    /// At most two entries; never overwritten.
    commitments: BTreeMap<ParticipantId, Commitment>,
    /// Subset of `commitments` keys.
    revealed: BTreeMap<ParticipantId, Move>,
    outcome: Option<Outcome>,
}

impl Match {
    /// Open a new match with the creator's commitment.
    pub fn create(id: MatchId, creator: ParticipantId, commitment: Commitment) -> Self {
        let mut commitments = BTreeMap::new();
        commitments.insert(creator, commitment);

        Self {
            id,
            creator,
            opponent: None,
            commitments,
            revealed: BTreeMap::new(),
            outcome: None,
        }
    }

    /// Fill the opponent slot. Open -> Active.
    pub fn accept(&mut self, opponent: ParticipantId, commitment: Commitment) -> Result<(), MatchError> {
        if self.opponent.is_some() || self.commitments.len() >= 2 {
            return Err(MatchError::AlreadyFull);
        }

        if opponent == self.creator {
            return Err(MatchError::SelfChallenge);
        }

        self.opponent = Some(opponent);
        self.commitments.insert(opponent, commitment);
        Ok(())
    }

    /// Disclose a move and nonce.
    ///
    /// The second successful reveal resolves the match.
    pub fn reveal(
        &mut self,
        participant: ParticipantId,
        mv: Move,
        nonce: &Nonce,
    ) -> Result<RevealOutcome, MatchError> {
        if !self.is_participant(&participant) {
            return Err(MatchError::UnknownParticipant);
        }

        if self.commitments.len() < 2 {
            return Err(MatchError::NotYetActive);
        }

        if self.revealed.contains_key(&participant) {
            return Err(MatchError::AlreadyRevealed);
        }

        let commitment = self
            .commitments
            .get(&participant)
            .ok_or(MatchError::UnknownParticipant)?;

        if !commitment.verify(&participant, mv, nonce) {
            return Err(MatchError::CommitmentMismatch);
        }

        self.revealed.insert(participant, mv);

        if self.revealed.len() == 2 {
            self.outcome = self.compute_outcome();
        }

        Ok(RevealOutcome {
            match_id: self.id,
            participant,
            revealed: mv,
            outcome: self.outcome,
        })
    }

    fn compute_outcome(&self) -> Option<Outcome> {
        let opponent = self.opponent?;
        let creator_move = *self.revealed.get(&self.creator)?;
        let opponent_move = *self.revealed.get(&opponent)?;
        Some(decide((self.creator, creator_move), (opponent, opponent_move)))
    }

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        if self.outcome.is_some() {
            MatchPhase::Resolved
        } else if self.commitments.len() < 2 {
            MatchPhase::Open
        } else if self.revealed.is_empty() {
            MatchPhase::Active
        } else {
            MatchPhase::PartiallyRevealed
        }
    }

    /// Match identifier.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Participant who opened the challenge.
    pub fn creator(&self) -> ParticipantId {
        self.creator
    }

    /// Participant who accepted, if any.
    pub fn opponent(&self) -> Option<ParticipantId> {
        self.opponent
    }

    /// True if `id` is the creator or opponent.
    pub fn is_participant(&self, id: &ParticipantId) -> bool {
        *id == self.creator || self.opponent.as_ref() == Some(id)
    }

    /// Whether the opponent has committed.
    pub fn has_opponent_committed(&self) -> bool {
        self.opponent
            .map(|o| self.commitments.contains_key(&o))
            .unwrap_or(false)
    }

    /// Stored commitment for a participant.
    pub fn commitment_of(&self, id: &ParticipantId) -> Option<&Commitment> {
        self.commitments.get(id)
    }

    /// Revealed move for a participant, if revealed.
    pub fn revealed_move(&self, id: &ParticipantId) -> Option<Move> {
        self.revealed.get(id).copied()
    }

    /// Outcome, once resolved.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// True once both reveals are in.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Read-only snapshot.
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            challenge_id: self.id,
            phase: self.phase(),
            creator: self.creator,
            opponent: self.opponent,
            opponent_committed: self.has_opponent_committed(),
            creator_commitment: self.commitments.get(&self.creator).copied(),
            opponent_commitment: self.opponent.and_then(|o| self.commitments.get(&o).copied()),
            creator_move: self.revealed_move(&self.creator),
            opponent_move: self.opponent.and_then(|o| self.revealed_move(&o)),
            winner: self.outcome.and_then(|o| o.winner()),
            draw: self.outcome.map(|o| o.is_draw()).unwrap_or(false),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
