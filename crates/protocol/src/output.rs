//! What a successful transaction hands back to its caller.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    instruction::BridgeInstruction,
    types::{ChainId, RequestId},
};

use crate::{messaging::OutboundRequest, whitelist::TokenPolicy};

/// Why a fee was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeReason {
    /// Deposit into the Portal.
    Synthesize,
    /// Cross-chain move of a synthetic token.
    Move,
}

/// A fee the treasury collaborator must be told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCredit {
    /// Chain on which the fee was collected.
    pub chain_id: ChainId,
    /// Token the fee is denominated in (origin token at the Portal, synthetic at the Synthesis).
    pub token: Address,
    /// The fee.
    pub amount: Amount,
    /// Why it was collected.
    pub reason: FeeReason,
}

/// Work that must be carried out after a transaction commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeDuty {
    /// Hand a request to the messaging endpoint.
    SendRequest(OutboundRequest),
    /// Notify the treasury of a collected fee.
    CreditTreasury(FeeCredit),
}

/// Observable facts recorded by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// An outbound request was emitted.
    RequestSent {
        /// Who initiated the transfer.
        sender: Address,
        /// Where the request is addressed.
        destination_contract: Address,
        /// The instruction.
        instruction: BridgeInstruction,
        /// The fee retained on this chain.
        fee: Amount,
        /// Whitelist version whose policy produced the fee.
        policy_version: u64,
    },

    /// An inbound request was settled.
    Settled {
        /// The request.
        request_id: RequestId,
        /// The settling contract.
        contract: Address,
        /// The settled instruction.
        instruction: BridgeInstruction,
    },

    /// An inbound request that was already settled on this chain was delivered again and left
    /// the state untouched.
    Ignored {
        /// The request.
        request_id: RequestId,
        /// The contract it was addressed to.
        contract: Address,
    },

    /// A synthetic token was created.
    SynthCreated {
        /// The synthetic token.
        synth: Address,
        /// The origin token.
        origin_token: Address,
        /// The origin chain.
        origin_chain_id: ChainId,
    },

    /// A cap changed.
    CapChanged {
        /// The capped token.
        token: Address,
        /// Previous cap.
        old_cap: Amount,
        /// New cap.
        new_cap: Amount,
    },

    /// A token policy changed.
    PolicyUpdated {
        /// The token.
        token: Address,
        /// The new policy.
        policy: TokenPolicy,
        /// The new whitelist version.
        version: u64,
    },

    /// A route changed.
    RouteUpdated {
        /// The chain.
        chain_id: ChainId,
        /// Its Portal.
        portal: Address,
        /// Its Synthesis.
        synthesis: Address,
        /// The new address book version.
        version: u64,
    },

    /// Synthetic tokens were burned.
    Burned {
        /// The synthetic token.
        synth: Address,
        /// Whose tokens were burned.
        from: Address,
        /// How much.
        amount: Amount,
    },

    /// Synthetic tokens were redeemed for the origin token on the same chain.
    Redeemed {
        /// The synthetic token.
        synth: Address,
        /// The origin token.
        token: Address,
        /// Who received the origin token.
        recipient: Address,
        /// How much.
        amount: Amount,
    },

    /// The Portal released origin tokens from custody.
    Unlocked {
        /// The origin token.
        token: Address,
        /// Who received it.
        recipient: Address,
        /// How much.
        amount: Amount,
    },

    /// The Portal minted a wrapped representation because custody was insufficient.
    WrappedMinted {
        /// The origin token.
        token: Address,
        /// The wrapped representation.
        wrapped: Address,
        /// Who received it.
        recipient: Address,
        /// How much.
        amount: Amount,
    },
}

/// Duties and events of a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOutput {
    /// Duties for external executors.
    pub duties: Vec<BridgeDuty>,
    /// Events in emission order.
    pub events: Vec<BridgeEvent>,
}

impl TxOutput {
    /// Creates an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output with a single event.
    pub fn with_event(event: BridgeEvent) -> Self {
        Self {
            duties: Vec::new(),
            events: vec![event],
        }
    }

    /// Appends a duty.
    pub fn push_duty(&mut self, duty: BridgeDuty) {
        self.duties.push(duty);
    }

    /// Appends an event.
    pub fn push_event(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }

    /// The outbound requests among the duties.
    pub fn requests(&self) -> impl Iterator<Item = &OutboundRequest> + '_ {
        self.duties.iter().filter_map(|duty| match duty {
            BridgeDuty::SendRequest(request) => Some(request),
            BridgeDuty::CreditTreasury(_) => None,
        })
    }
}
