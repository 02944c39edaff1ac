//! Moves and Outcomes
//!
//! The three hand shapes, the beats relation, and the pure winner rule.

use std::fmt;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::ids::ParticipantId;

/// A Rock-Paper-Scissors move.
///
/// Wire code is the discriminant; serde uses the code, not the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Move {
    /// Beats Scissors.
    Rock = 0,
    /// Beats Rock.
    Paper = 1,
    /// Beats Paper.
    Scissors = 2,
}

/// Move code outside 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid move code {0} (expected 0 = Rock, 1 = Paper, 2 = Scissors)")]
pub struct InvalidMoveCode(pub i64);

impl Move {
    /// All moves in code order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Decode from a wire code.
    pub fn from_code(code: i64) -> Result<Self, InvalidMoveCode> {
        match code {
            0 => Ok(Move::Rock),
            1 => Ok(Move::Paper),
            2 => Ok(Move::Scissors),
            other => Err(InvalidMoveCode(other)),
        }
    }

    /// Wire code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The move this one defeats.
    pub fn defeats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
        }
    }

    /// True if `self` beats `other`. Never true for equal moves.
    #[inline]
    pub fn beats(self, other: Move) -> bool {
        self.defeats() == other
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        }
    }
}

impl TryFrom<i64> for Move {
    type Error = InvalidMoveCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl TryFrom<u8> for Move {
    type Error = InvalidMoveCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(code))
    }
}

impl From<Move> for u8 {
    fn from(mv: Move) -> Self {
        mv.code()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a resolved match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "winner", rename_all = "snake_case")]
pub enum Outcome {
    /// The participant holding the winning move.
    Winner(ParticipantId),
    /// Both revealed the same move.
    Draw,
}

impl Outcome {
    /// Winner identity, if not a draw.
    pub fn winner(&self) -> Option<ParticipantId> {
        match self {
            Outcome::Winner(id) => Some(*id),
            Outcome::Draw => None,
        }
    }

    /// True for a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

/// Decide a match from two revealed moves.
///
/// Argument order does not matter.
pub fn decide(a: (ParticipantId, Move), b: (ParticipantId, Move)) -> Outcome {
    let (a_id, a_move) = a;
    let (b_id, b_move) = b;

    if a_move.beats(b_move) {
        Outcome::Winner(a_id)
    } else if b_move.beats(a_move) {
        Outcome::Winner(b_id)
    } else {
        Outcome::Draw
    }
}
