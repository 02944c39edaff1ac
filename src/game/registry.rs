//! Match Registry
//!
//! Owns every live match and the participant -> match index.
//! All mutation goes through the methods here, so the two maps can't drift.
//!
//! Each operation validates everything before touching state. An `Err`
//! means nothing changed.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::ids::{MatchId, ParticipantId};
use crate::game::moves::Move;
use crate::game::state::{Match, MatchError, MatchSummary, RevealOutcome};
use crate::proof::commitment::{Commitment, Nonce};

/// Registry-level rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No commitment supplied.
    #[error("no commitment")]
    MissingCommitment,

    /// Participant already occupies a live match.
    #[error("player {participant} is already in challenge {match_id}")]
    AlreadyInMatch {
        /// Offending participant.
        participant: ParticipantId,
        /// Match they are in.
        match_id: MatchId,
    },

    /// Unknown match id.
    #[error("challenge {0} does not exist")]
    NoSuchMatch(MatchId),

    /// Reveal from someone with no live match.
    #[error("player {0} is not in any challenge")]
    NotInAnyMatch(ParticipantId),

    /// The match itself rejected the intent.
    #[error("challenge {match_id}: {source}")]
    Match {
        /// Match that rejected.
        match_id: MatchId,
        /// Reason.
        #[source]
        source: MatchError,
    },
}

impl RegistryError {
    /// Underlying match error, if any.
    pub fn match_error(&self) -> Option<MatchError> {
        match self {
            Self::Match { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// All live matches.
#[derive(Debug, Default)]
pub struct Registry {
    /// Open, Active and PartiallyRevealed matches.
    matches: BTreeMap<MatchId, Match>,
    /// Participant to match mapping.
    active_by_participant: BTreeMap<ParticipantId, MatchId>,
    /// Next id to hand out.
    next_id: MatchId,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new challenge.
    pub fn open_challenge(
        &mut self,
        participant: ParticipantId,
        commitment: Option<Commitment>,
    ) -> Result<MatchId, RegistryError> {
        let commitment = commitment.ok_or(RegistryError::MissingCommitment)?;

        if let Some(&match_id) = self.active_by_participant.get(&participant) {
            return Err(RegistryError::AlreadyInMatch { participant, match_id });
        }

        let id = self.next_id;
        self.next_id += 1;

        self.matches.insert(id, Match::create(id, participant, commitment));
        self.active_by_participant.insert(participant, id);

        info!(match_id = id, creator = %participant, "Challenge created");
        Ok(id)
    }

    /// Accept an open challenge.
    pub fn accept_challenge(
        &mut self,
        participant: ParticipantId,
        match_id: MatchId,
        commitment: Option<Commitment>,
    ) -> Result<(), RegistryError> {
        if !self.matches.contains_key(&match_id) {
            return Err(RegistryError::NoSuchMatch(match_id));
        }

        let commitment = commitment.ok_or(RegistryError::MissingCommitment)?;

        if let Some(&current) = self.active_by_participant.get(&participant) {
            if current != match_id {
                return Err(RegistryError::AlreadyInMatch { participant, match_id: current });
            }
        }

        let game = self
            .matches
            .get_mut(&match_id)
            .ok_or(RegistryError::NoSuchMatch(match_id))?;
        game.accept(participant, commitment)
            .map_err(|source| RegistryError::Match { match_id, source })?;

        self.active_by_participant.insert(participant, match_id);

        info!(match_id, opponent = %participant, "Challenge accepted");
        Ok(())
    }

    /// Reveal a move in the participant's current match.
    ///
    /// Resolving the match removes it and frees both participants.
    pub fn reveal(
        &mut self,
        participant: ParticipantId,
        mv: Move,
        nonce: &Nonce,
    ) -> Result<RevealOutcome, RegistryError> {
        let match_id = *self
            .active_by_participant
            .get(&participant)
            .ok_or(RegistryError::NotInAnyMatch(participant))?;

        let game = self
            .matches
            .get_mut(&match_id)
            .ok_or(RegistryError::NoSuchMatch(match_id))?;

        let outcome = game
            .reveal(participant, mv, nonce)
            .map_err(|source| RegistryError::Match { match_id, source })?;

        debug!(match_id, participant = %participant, revealed = %mv, "Move revealed");

        if outcome.is_resolved() {
            self.remove_match(match_id);
            info!(match_id, outcome = ?outcome.outcome, "Challenge resolved");
        }

        Ok(outcome)
    }

    /// Drop a match and its index entries.
    fn remove_match(&mut self, match_id: MatchId) {
        if let Some(game) = self.matches.remove(&match_id) {
            self.active_by_participant.remove(&game.creator());
            if let Some(opponent) = game.opponent() {
                self.active_by_participant.remove(&opponent);
            }
        }
    }

    /// Snapshot of live matches, lowest id first.
    pub fn list_challenges(&self) -> Vec<MatchSummary> {
        self.matches.values().map(Match::summary).collect()
    }

    /// Look up a live match.
    pub fn get(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.get(&match_id)
    }

    /// Match a participant currently occupies.
    pub fn match_of(&self, participant: &ParticipantId) -> Option<MatchId> {
        self.active_by_participant.get(participant).copied()
    }

    /// Id the next challenge will get.
    pub fn next_match_id(&self) -> MatchId {
        self.next_id
    }

    /// Live match count.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True when no match is live.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Outcome;
    use crate::game::state::MatchPhase;

    fn alice() -> ParticipantId {
        ParticipantId::new([0xA1; 20])
    }

    fn bob() -> ParticipantId {
        ParticipantId::new([0xB0; 20])
    }

    fn carol() -> ParticipantId {
        ParticipantId::new([0xC4; 20])
    }

    fn nonce(s: &str) -> Nonce {
        Nonce::new(s.as_bytes().to_vec()).unwrap()
    }

    fn commit(who: ParticipantId, mv: Move, n: &str) -> Option<Commitment> {
        Some(Commitment::compute(&who, mv, &nonce(n)))
    }

    /// Checks the index mirrors the match slots exactly.
    fn assert_index_consistent(registry: &Registry) {
        let mut expected = BTreeMap::new();
        for game in registry.matches.values() {
            assert!(expected.insert(game.creator(), game.id()).is_none());
            if let Some(opponent) = game.opponent() {
                assert!(expected.insert(opponent, game.id()).is_none());
            }
        }
        assert_eq!(expected, registry.active_by_participant);
    }

    #[test]
    fn test_open_allocates_sequential_ids() {
        let mut registry = Registry::new();
        assert_eq!(registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")), Ok(0));
        assert_eq!(registry.open_challenge(bob(), commit(bob(), Move::Rock, "b")), Ok(1));
        assert_eq!(registry.next_match_id(), 2);
        assert_eq!(registry.len(), 2);
        assert_index_consistent(&registry);
    }

    #[test]
    fn test_open_twice_rejected() {
        let mut registry = Registry::new();
        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();

        let result = registry.open_challenge(alice(), commit(alice(), Move::Paper, "a2"));
        assert_eq!(
            result,
            Err(RegistryError::AlreadyInMatch { participant: alice(), match_id: 0 })
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.next_match_id(), 1);
    }

    #[test]
    fn test_missing_commitment() {
        let mut registry = Registry::new();
        assert_eq!(registry.open_challenge(alice(), None), Err(RegistryError::MissingCommitment));
        assert!(registry.is_empty());
        assert_eq!(registry.next_match_id(), 0);

        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();
        assert_eq!(registry.accept_challenge(bob(), 0, None), Err(RegistryError::MissingCommitment));
        assert_eq!(registry.match_of(&bob()), None);
    }

    #[test]
    fn test_accept_unknown_match() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.accept_challenge(bob(), 42, commit(bob(), Move::Rock, "b")),
            Err(RegistryError::NoSuchMatch(42))
        );
    }

    #[test]
    fn test_accept_while_in_other_match() {
        let mut registry = Registry::new();
        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();
        registry.open_challenge(bob(), commit(bob(), Move::Rock, "b")).unwrap();

        let result = registry.accept_challenge(bob(), 0, commit(bob(), Move::Paper, "b2"));
        assert_eq!(result, Err(RegistryError::AlreadyInMatch { participant: bob(), match_id: 1 }));
        assert_eq!(registry.get(0).unwrap().phase(), MatchPhase::Open);
        assert_index_consistent(&registry);
    }

    #[test]
    fn test_self_challenge_rejected() {
        let mut registry = Registry::new();
        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();

        let result = registry.accept_challenge(alice(), 0, commit(alice(), Move::Paper, "a2"));
        assert_eq!(
            result,
            Err(RegistryError::Match { match_id: 0, source: MatchError::SelfChallenge })
        );
        assert_eq!(registry.get(0).unwrap().phase(), MatchPhase::Open);
    }

    #[test]
    fn test_accept_full_match() {
        let mut registry = Registry::new();
        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();
        registry.accept_challenge(bob(), 0, commit(bob(), Move::Rock, "b")).unwrap();

        let result = registry.accept_challenge(carol(), 0, commit(carol(), Move::Rock, "c"));
        assert_eq!(result.unwrap_err().match_error(), Some(MatchError::AlreadyFull));
        assert_eq!(registry.match_of(&carol()), None);
        assert_index_consistent(&registry);
    }

    #[test]
    fn test_reveal_not_in_match() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.reveal(carol(), Move::Rock, &nonce("c")),
            Err(RegistryError::NotInAnyMatch(carol()))
        );
    }

    #[test]
    fn test_reveal_before_accept() {
        let mut registry = Registry::new();
        registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();
        let err = registry.reveal(alice(), Move::Rock, &nonce("a")).unwrap_err();
        assert_eq!(err.match_error(), Some(MatchError::NotYetActive));
    }

    #[test]
    fn test_full_match_rock_beats_scissors() {
        let mut registry = Registry::new();
        let id = registry.open_challenge(alice(), commit(alice(), Move::Rock, "na")).unwrap();
        registry.accept_challenge(bob(), id, commit(bob(), Move::Scissors, "nb")).unwrap();
        assert_index_consistent(&registry);

        let first = registry.reveal(alice(), Move::Rock, &nonce("na")).unwrap();
        assert!(!first.is_resolved());
        assert_eq!(registry.list_challenges()[0].phase, MatchPhase::PartiallyRevealed);

        let second = registry.reveal(bob(), Move::Scissors, &nonce("nb")).unwrap();
        assert_eq!(second.outcome, Some(Outcome::Winner(alice())));

        // Resolved match is gone and both players are free
        assert!(registry.list_challenges().is_empty());
        assert!(registry.get(id).is_none());
        assert_eq!(registry.match_of(&alice()), None);
        assert_eq!(registry.match_of(&bob()), None);
        assert_index_consistent(&registry);
    }

    #[test]
    fn test_paper_paper_draw() {
        let mut registry = Registry::new();
        let id = registry.open_challenge(alice(), commit(alice(), Move::Paper, "n1")).unwrap();
        registry.accept_challenge(bob(), id, commit(bob(), Move::Paper, "n2")).unwrap();

        registry.reveal(bob(), Move::Paper, &nonce("n2")).unwrap();
        let out = registry.reveal(alice(), Move::Paper, &nonce("n1")).unwrap();
        assert_eq!(out.outcome, Some(Outcome::Draw));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mismatch_leaves_state_and_allows_retry() {
        let mut registry = Registry::new();
        let id = registry.open_challenge(alice(), commit(alice(), Move::Rock, "na")).unwrap();
        registry.accept_challenge(bob(), id, commit(bob(), Move::Scissors, "nb")).unwrap();

        let err = registry.reveal(bob(), Move::Rock, &nonce("nb")).unwrap_err();
        assert_eq!(err.match_error(), Some(MatchError::CommitmentMismatch));
        assert_eq!(registry.get(id).unwrap().phase(), MatchPhase::Active);
        assert_eq!(registry.match_of(&bob()), Some(id));

        registry.reveal(alice(), Move::Rock, &nonce("na")).unwrap();
        registry.reveal(bob(), Move::Scissors, &nonce("nb")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_never_reused() {
        let mut registry = Registry::new();
        let id = registry.open_challenge(alice(), commit(alice(), Move::Rock, "a")).unwrap();
        registry.accept_challenge(bob(), id, commit(bob(), Move::Rock, "b")).unwrap();
        registry.reveal(alice(), Move::Rock, &nonce("a")).unwrap();
        registry.reveal(bob(), Move::Rock, &nonce("b")).unwrap();
        assert!(registry.is_empty());

        // Alice is free again and gets a fresh id
        let next = registry.open_challenge(alice(), commit(alice(), Move::Paper, "a2")).unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let mut registry = Registry::new();
        let players: Vec<ParticipantId> = (1..=5).map(|i| ParticipantId::new([i; 20])).collect();
        for p in &players {
            registry.open_challenge(*p, commit(*p, Move::Rock, "x")).unwrap();
        }

        let ids: Vec<MatchId> = registry.list_challenges().iter().map(|s| s.challenge_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(registry.list_challenges().iter().all(|s| !s.opponent_committed));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Open(u8, u8),
            Accept(u8, MatchId, u8),
            Reveal(u8, u8, bool),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..4, 0u8..3).prop_map(|(p, m)| Op::Open(p, m)),
                (0u8..4, 0u64..6, 0u8..3).prop_map(|(p, id, m)| Op::Accept(p, id, m)),
                (0u8..4, 0u8..3, any::<bool>()).prop_map(|(p, m, honest)| Op::Reveal(p, m, honest)),
            ]
        }

        proptest! {
            #[test]
            fn prop_index_stays_consistent(ops in proptest::collection::vec(op(), 1..60)) {
                let mut registry = Registry::new();
                // Remember what each player committed to so honest reveals can succeed
                let mut secrets: BTreeMap<ParticipantId, Move> = BTreeMap::new();

                for op in ops {
                    let before_next = registry.next_match_id();
                    match op {
                        Op::Open(p, m) => {
                            let who = ParticipantId::new([p; 20]);
                            let mv = Move::ALL[m as usize];
                            if registry.open_challenge(who, commit(who, mv, "n")).is_ok() {
                                secrets.insert(who, mv);
                            }
                        }
                        Op::Accept(p, id, m) => {
                            let who = ParticipantId::new([p; 20]);
                            let mv = Move::ALL[m as usize];
                            if registry.accept_challenge(who, id, commit(who, mv, "n")).is_ok() {
                                secrets.insert(who, mv);
                            }
                        }
                        Op::Reveal(p, m, honest) => {
                            let who = ParticipantId::new([p; 20]);
                            let mv = if honest {
                                secrets.get(&who).copied().unwrap_or(Move::ALL[m as usize])
                            } else {
                                Move::ALL[m as usize]
                            };
                            let _ = registry.reveal(who, mv, &nonce("n"));
                        }
                    }

                    assert_index_consistent(&registry);
                    prop_assert!(registry.next_match_id() >= before_next);
                    prop_assert!(registry.list_challenges().iter().all(|s| s.phase != MatchPhase::Resolved));
                }
            }
        }
    }
}
