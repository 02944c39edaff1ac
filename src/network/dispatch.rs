//! Request Dispatch
//!
//! Routes decoded requests to the registry and renders the results.
//! The registry sits behind a single mutex; every request holds it for its
//! whole duration, so intents are applied strictly one after another.

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::core::ids::{InvalidAddress, MatchId, ParticipantId};
use crate::game::events::ArenaEvent;
use crate::game::moves::InvalidMoveCode;
use crate::game::registry::{Registry, RegistryError};
use crate::game::state::MatchSummary;
use crate::network::protocol::{
    AdvanceRequest, AdvanceResponse, ArenaRequest, ChallengeList, InspectResponse, Output, Status,
};
use crate::proof::commitment::{CommitmentError, DEFAULT_MAX_NONCE_LEN};

/// Anything that turns an advance request into a rejection.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Sender is not a valid address.
    #[error("invalid sender: {0}")]
    Sender(#[from] InvalidAddress),

    /// Payload has no `method` string.
    #[error("payload has no method")]
    MissingMethod,

    /// Method not routed.
    #[error("unknown method {0:?}")]
    UnknownMethod(String),

    /// Payload fields have the wrong shape.
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Move is not a number.
    #[error("move {0} is not numeric")]
    NonNumericMove(String),

    /// Move code out of range.
    #[error(transparent)]
    InvalidMove(#[from] InvalidMoveCode),

    /// Bad commitment or nonce.
    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    /// Registry or match rejected the intent.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Routes requests to a registry it owns.
pub struct Dispatcher {
    /// Live matches. One lock for all of them.
    registry: Mutex<Registry>,
    /// Nonce length limit for reveals.
    max_nonce_len: usize,
}

impl Dispatcher {
    /// Create a dispatcher over an empty registry.
    pub fn new(max_nonce_len: usize) -> Self {
        Self::with_registry(Registry::new(), max_nonce_len)
    }

    /// Create a dispatcher over an existing registry.
    pub fn with_registry(registry: Registry, max_nonce_len: usize) -> Self {
        Self {
            registry: Mutex::new(registry),
            max_nonce_len,
        }
    }

    /// Handle a state-changing request.
    ///
    /// Never fails: rejections come back as a report with `Reject` status.
    #[instrument(skip(self, request), fields(sender = %request.sender))]
    pub async fn advance(&self, request: AdvanceRequest) -> AdvanceResponse {
        match self.apply(request).await {
            Ok(events) => {
                let outputs = events
                    .iter()
                    .map(|event| {
                        info!("Adding notice: {}", event);
                        Output::notice(&event.to_string())
                    })
                    .collect();
                AdvanceResponse::accept(outputs)
            }
            Err(e) => {
                warn!("Rejecting request: {}", e);
                AdvanceResponse::reject(&e.to_string())
            }
        }
    }

    /// Decode, route and apply one request.
    async fn apply(&self, request: AdvanceRequest) -> Result<Vec<ArenaEvent>, DispatchError> {
        let sender = ParticipantId::from_hex(&request.sender)?;
        let intent = ArenaRequest::from_payload(request.payload, self.max_nonce_len)?;
        debug!(method = intent.method(), "Routing request");

        let mut registry = self.registry.lock().await;

        let events = match intent {
            ArenaRequest::CreateChallenge { commitment } => {
                let match_id = registry.open_challenge(sender, commitment)?;
                vec![ArenaEvent::ChallengeCreated { match_id, creator: sender }]
            }
            ArenaRequest::AcceptChallenge { challenge_id, commitment } => {
                registry.accept_challenge(sender, challenge_id, commitment)?;
                vec![ArenaEvent::ChallengeAccepted { match_id: challenge_id, opponent: sender }]
            }
            ArenaRequest::Reveal { mv, nonce } => {
                let outcome = registry.reveal(sender, mv, &nonce)?;
                ArenaEvent::from_reveal(&outcome)
            }
        };

        Ok(events)
    }

    /// Handle a read-only request: one report with every live challenge.
    #[instrument(skip(self))]
    pub async fn inspect(&self) -> Result<InspectResponse, DispatchError> {
        let challenges = self.challenges().await;
        let body = serde_json::to_string(&ChallengeList { challenges })?;
        debug!("Adding report ({} bytes)", body.len());

        Ok(InspectResponse {
            status: Status::Accept,
            reports: vec![Output::report(&body)],
        })
    }

    /// Snapshot of live challenges.
    pub async fn challenges(&self) -> Vec<MatchSummary> {
        self.registry.lock().await.list_challenges()
    }

    /// Match a participant currently occupies.
    pub async fn match_of(&self, participant: &ParticipantId) -> Option<MatchId> {
        self.registry.lock().await.match_of(participant)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NONCE_LEN)
    }
}
