//! Arena Events
//!
//! State changes produced by the registry. The dispatcher renders them
//! into notices; the wording lives in the `Display` impl.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::ids::{MatchId, ParticipantId};
use crate::game::moves::{Move, Outcome};
use crate::game::state::RevealOutcome;

/// A state change worth announcing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArenaEvent {
    /// New challenge opened.
    ChallengeCreated {
        /// New match.
        match_id: MatchId,
        /// Who opened it.
        creator: ParticipantId,
    },

    /// Opponent committed.
    ChallengeAccepted {
        /// Accepted match.
        match_id: MatchId,
        /// Who accepted.
        opponent: ParticipantId,
    },

    /// A participant's reveal verified.
    MoveRevealed {
        /// Match revealed in.
        match_id: MatchId,
        /// Who revealed.
        participant: ParticipantId,
        /// Verified move.
        revealed: Move,
    },

    /// Both reveals in; match removed from the registry.
    MatchResolved {
        /// Removed match.
        match_id: MatchId,
        /// Winner or draw.
        outcome: Outcome,
    },
}

impl ArenaEvent {
    /// Match this event refers to.
    pub fn match_id(&self) -> MatchId {
        match self {
            Self::ChallengeCreated { match_id, .. }
            | Self::ChallengeAccepted { match_id, .. }
            | Self::MoveRevealed { match_id, .. }
            | Self::MatchResolved { match_id, .. } => *match_id,
        }
    }

    /// Events announcing an accepted reveal, in emission order.
    pub fn from_reveal(outcome: &RevealOutcome) -> Vec<ArenaEvent> {
        let mut events = vec![ArenaEvent::MoveRevealed {
            match_id: outcome.match_id,
            participant: outcome.participant,
            revealed: outcome.revealed,
        }];

        if let Some(result) = outcome.outcome {
            events.push(ArenaEvent::MatchResolved {
                match_id: outcome.match_id,
                outcome: result,
            });
        }

        events
    }
}

impl fmt::Display for ArenaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChallengeCreated { match_id, creator } => {
                write!(f, "challenge with id {} was created by {}", match_id, creator)
            }
            Self::ChallengeAccepted { match_id, opponent } => {
                write!(f, "challenge with id {} was accepted by {}", match_id, opponent)
            }
            Self::MoveRevealed { match_id, participant, revealed } => {
                write!(f, "Challenge {}: {} revealed their move of {}", match_id, participant, revealed)
            }
            Self::MatchResolved { match_id, outcome: Outcome::Winner(winner) } => {
                write!(f, "Challenge {} was won by {}", match_id, winner)
            }
            Self::MatchResolved { match_id, outcome: Outcome::Draw } => {
                write!(f, "Challenge {} ended in a draw", match_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u8) -> ParticipantId {
        ParticipantId::new([n; 20])
    }

    #[test]
    fn test_event_text() {
        let created = ArenaEvent::ChallengeCreated { match_id: 3, creator: pid(1) };
        assert_eq!(
            created.to_string(),
            format!("challenge with id 3 was created by {}", pid(1))
        );

        let draw = ArenaEvent::MatchResolved { match_id: 3, outcome: Outcome::Draw };
        assert_eq!(draw.to_string(), "Challenge 3 ended in a draw");

        let revealed = ArenaEvent::MoveRevealed { match_id: 3, participant: pid(2), revealed: Move::Scissors };
        assert!(revealed.to_string().ends_with("revealed their move of Scissors"));
    }

    #[test]
    fn test_from_reveal() {
        let partial = RevealOutcome {
            match_id: 1,
            participant: pid(1),
            revealed: Move::Rock,
            outcome: None,
        };
        assert_eq!(ArenaEvent::from_reveal(&partial).len(), 1);

        let resolved = RevealOutcome { outcome: Some(Outcome::Winner(pid(1))), ..partial };
        let events = ArenaEvent::from_reveal(&resolved);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].match_id(), 1);
        assert!(matches!(events[1], ArenaEvent::MatchResolved { .. }));
    }
}
