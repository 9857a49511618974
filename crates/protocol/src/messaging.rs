//! The contract between the bridge and the messaging layer that carries its requests.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    instruction::BridgeInstruction,
    types::{ChainId, RequestId},
};

use crate::errors::BridgeResult;

/// A request handed to the messaging endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Chain emitting the request.
    pub source_chain: ChainId,
    /// Contract emitting the request.
    pub source_contract: Address,
    /// Chain that must settle the request.
    pub destination_chain: ChainId,
    /// Contract that must settle the request.
    pub destination_contract: Address,
    /// The encoded [`BridgeInstruction`].
    pub payload: Vec<u8>,
}

impl OutboundRequest {
    pub(crate) fn new(
        source_chain: ChainId,
        source_contract: Address,
        destination_contract: Address,
        instruction: &BridgeInstruction,
    ) -> BridgeResult<Self> {
        Ok(Self {
            source_chain,
            source_contract,
            destination_chain: instruction.destination_chain_id,
            destination_contract,
            payload: instruction.encode()?,
        })
    }
}

/// A request as delivered to the destination contract.
///
/// The source chain and contract are claims made by the messaging layer; contracts check them
/// against their address book before acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The id assigned by the endpoint.
    pub request_id: RequestId,
    /// Claimed source chain.
    pub source_chain: ChainId,
    /// Claimed source contract.
    pub source_contract: Address,
    /// The encoded [`BridgeInstruction`].
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Builds the message delivered for `request`.
    pub fn from_request(request_id: RequestId, request: &OutboundRequest) -> Self {
        Self {
            request_id,
            source_chain: request.source_chain,
            source_contract: request.source_contract,
            payload: request.payload.clone(),
        }
    }
}

/// Accepts outbound requests and assigns them unique ids.
///
/// Delivery happens elsewhere, at least once per request, and implementations are expected to
/// guard against settling the same id twice.
pub trait MessagingEndpoint: Send + Sync {
    /// Queues `request` for delivery and returns its id.
    fn send(&self, request: OutboundRequest) -> RequestId;
}
