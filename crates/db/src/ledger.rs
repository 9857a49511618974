//! The request ledger interface.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    types::{ChainId, RequestId},
};

use crate::errors::DbResult;

/// A request as handed to the messaging endpoint, with the id it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// The id assigned by the endpoint.
    pub request_id: RequestId,
    /// Chain that emitted the request.
    pub source_chain: ChainId,
    /// Contract that emitted the request.
    pub source_contract: Address,
    /// Chain that must settle the request.
    pub destination_chain: ChainId,
    /// Contract that must settle the request.
    pub destination_contract: Address,
    /// The encoded bridge instruction.
    pub payload: Vec<u8>,
}

/// Delivery state of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Recorded, not delivered yet.
    Sent,
    /// Accepted by the destination contract. Final.
    Settled,
    /// The last delivery attempt was rejected.
    Failed {
        /// Why the destination rejected it.
        reason: String,
    },
}

impl RequestState {
    /// Whether the request still needs to be delivered.
    pub const fn is_pending(&self) -> bool {
        !matches!(self, RequestState::Settled)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Sent => write!(f, "sent"),
            RequestState::Settled => write!(f, "settled"),
            RequestState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Everything the ledger knows about a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// The request.
    pub envelope: RequestEnvelope,
    /// Its delivery state.
    pub state: RequestState,
    /// Delivery attempts made so far, ignored redeliveries excluded.
    pub attempts: u32,
    /// Redeliveries of the request after it was settled.
    pub ignored: u32,
}

impl RequestRecord {
    /// A freshly recorded request.
    pub const fn new(envelope: RequestEnvelope) -> Self {
        Self {
            envelope,
            state: RequestState::Sent,
            attempts: 0,
            ignored: 0,
        }
    }
}

/// Persistence of the replay guard.
///
/// Implementations must keep [`RequestState::Settled`] final: once a request is settled, no
/// state change is accepted for it.
#[async_trait]
pub trait RequestLedgerDb {
    /// Records a new request in the [`RequestState::Sent`] state.
    ///
    /// Returns `false` and changes nothing if the id is already recorded.
    async fn record_sent(&self, envelope: RequestEnvelope) -> DbResult<bool>;

    /// Gets, if present, the record of a request.
    async fn get_request(&self, request_id: RequestId) -> DbResult<Option<RequestRecord>>;

    /// Counts a delivery attempt and returns the new count.
    async fn record_attempt(&self, request_id: RequestId) -> DbResult<u32>;

    /// Moves a request to `state`. Fails if the request is already settled.
    async fn set_state(&self, request_id: RequestId, state: RequestState) -> DbResult<()>;

    /// Counts a redelivery of a settled request and returns the new count.
    async fn record_ignored(&self, request_id: RequestId) -> DbResult<u32>;

    /// Requests that are not settled yet, in the order they were recorded.
    async fn pending(&self) -> DbResult<Vec<RequestRecord>>;

    /// Number of requests ever recorded for `source_chain`, settled or not.
    async fn sent_count(&self, source_chain: ChainId) -> DbResult<u64>;
}
