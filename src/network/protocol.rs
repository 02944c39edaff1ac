//! Protocol Messages
//!
//! JSON shapes exchanged with the host that feeds the arena.
//! Advance requests carry a sender and a `method`-tagged payload;
//! responses carry notices and reports with hex-encoded text.

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::core::ids::MatchId;
use crate::game::moves::Move;
use crate::game::state::MatchSummary;
use crate::network::dispatch::DispatchError;
use crate::proof::commitment::{Commitment, Nonce};

// =============================================================================
// HOST -> ARENA
// =============================================================================

/// State-changing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    /// Authenticated sender address (hex). Trusted as given.
    pub sender: String,
    /// Method-tagged JSON payload.
    pub payload: Value,
}

/// Read-only request. The payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectRequest {
    /// Unused.
    #[serde(default)]
    pub payload: Option<Value>,
}

/// One line of driver input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerRequest {
    /// Apply an intent.
    Advance(AdvanceRequest),
    /// List challenges.
    Inspect(InspectRequest),
}

impl ServerRequest {
    /// Parse from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Decoded advance payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaRequest {
    /// Open a new challenge.
    CreateChallenge {
        /// Empty or absent is passed on as `None`.
        commitment: Option<Commitment>,
    },
    /// Accept an open challenge.
    AcceptChallenge {
        /// Target match.
        challenge_id: MatchId,
        /// Empty or absent is passed on as `None`.
        commitment: Option<Commitment>,
    },
    /// Reveal a committed move.
    Reveal {
        /// Disclosed move.
        mv: Move,
        /// Disclosed nonce.
        nonce: Nonce,
    },
}

#[derive(Deserialize)]
struct CreateChallengePayload {
    #[serde(default)]
    commitment: Option<String>,
}

#[derive(Deserialize)]
struct AcceptChallengePayload {
    challenge_id: MatchId,
    #[serde(default)]
    commitment: Option<String>,
}

#[derive(Deserialize)]
struct RevealPayload {
    #[serde(rename = "move")]
    mv: Value,
    #[serde(default)]
    nonce: Option<String>,
}

impl ArenaRequest {
    /// Decode a payload, routing on its `method` field.
    pub fn from_payload(payload: Value, max_nonce_len: usize) -> Result<Self, DispatchError> {
        let method = payload
            .get("method")
            .and_then(Value::as_str)
            .ok_or(DispatchError::MissingMethod)?
            .to_string();

        match method.as_str() {
            "create_challenge" => {
                let p: CreateChallengePayload = serde_json::from_value(payload)?;
                Ok(Self::CreateChallenge {
                    commitment: parse_commitment(p.commitment)?,
                })
            }
            "accept_challenge" => {
                let p: AcceptChallengePayload = serde_json::from_value(payload)?;
                Ok(Self::AcceptChallenge {
                    challenge_id: p.challenge_id,
                    commitment: parse_commitment(p.commitment)?,
                })
            }
            "reveal" => {
                let p: RevealPayload = serde_json::from_value(payload)?;
                let mv = parse_move(&p.mv)?;
                let nonce = Nonce::with_limit(p.nonce.unwrap_or_default().into_bytes(), max_nonce_len)?;
                Ok(Self::Reveal { mv, nonce })
            }
            _ => Err(DispatchError::UnknownMethod(method)),
        }
    }

    /// Method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateChallenge { .. } => "create_challenge",
            Self::AcceptChallenge { .. } => "accept_challenge",
            Self::Reveal { .. } => "reveal",
        }
    }
}

/// Empty string counts as absent.
fn parse_commitment(raw: Option<String>) -> Result<Option<Commitment>, DispatchError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(Commitment::from_hex(s)?)),
    }
}

/// Accepts a JSON integer or a numeric string.
fn parse_move(raw: &Value) -> Result<Move, DispatchError> {
    let code = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| DispatchError::NonNumericMove(raw.to_string()))?;

    Ok(Move::from_code(code)?)
}

// =============================================================================
// ARENA -> HOST
// =============================================================================

/// Whether the host should keep the request's effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Applied.
    Accept,
    /// Rejected, nothing changed.
    Reject,
}

/// Outward message. Payload is `0x`-prefixed hex of UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    /// Announces a state change.
    Notice {
        /// Hex-encoded text.
        payload: String,
    },
    /// Answers a query or explains a rejection.
    Report {
        /// Hex-encoded text.
        payload: String,
    },
}

impl Output {
    /// Notice carrying `text`.
    pub fn notice(text: &str) -> Self {
        Self::Notice { payload: encode_text(text) }
    }

    /// Report carrying `text`.
    pub fn report(text: &str) -> Self {
        Self::Report { payload: encode_text(text) }
    }

    /// Decoded text, if the payload is valid hex UTF-8.
    pub fn text(&self) -> Option<String> {
        let payload = match self {
            Self::Notice { payload } | Self::Report { payload } => payload,
        };
        let bytes = hex::decode(payload.strip_prefix("0x").unwrap_or(payload)).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// True for notices.
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::Notice { .. })
    }
}

fn encode_text(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}

/// Response to an advance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceResponse {
    /// Accept or reject.
    pub status: Status,
    /// Notices on accept, one report on reject.
    pub outputs: Vec<Output>,
}

impl AdvanceResponse {
    /// Accepted with outputs.
    pub fn accept(outputs: Vec<Output>) -> Self {
        Self { status: Status::Accept, outputs }
    }

    /// Rejected with a single reason report.
    pub fn reject(reason: &str) -> Self {
        Self { status: Status::Reject, outputs: vec![Output::report(reason)] }
    }

    /// True if accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == Status::Accept
    }
}

/// Report body for an inspect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeList {
    /// Live challenges, lowest id first.
    pub challenges: Vec<MatchSummary>,
}

/// Response to an inspect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectResponse {
    /// Always accept.
    pub status: Status,
    /// One report holding a [`ChallengeList`] as JSON.
    pub reports: Vec<Output>,
}

/// One line of driver output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerResponse {
    /// Result of an advance request.
    Advance(AdvanceResponse),
    /// Result of an inspect request.
    Inspect(InspectResponse),
    /// Line could not be handled.
    Error {
        /// Reason.
        message: String,
    },
}

impl ServerResponse {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
