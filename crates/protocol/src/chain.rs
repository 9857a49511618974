//! The contract state of a single chain and its transactional boundary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    types::{ChainId, RequestId},
};
use tracing::{debug, info, warn};

use crate::{
    access::{AccessControl, Role},
    address_book::{AddressBook, Route},
    errors::{BridgeError, BridgeResult},
    ledger::{Token, TokenLedger},
    messaging::InboundMessage,
    output::{BridgeEvent, TxOutput},
    portal::{Portal, PortalState},
    registry::SynthRegistry,
    synthesis::{Synthesis, SynthesisState},
    whitelist::{TokenPolicy, Whitelist},
};

/// Identity of a chain and the addresses of its bridge contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// The chain id.
    pub chain_id: ChainId,
    /// Short chain symbol, embedded in synthetic token names.
    pub symbol: String,
    /// The Portal.
    pub portal: Address,
    /// The Synthesis.
    pub synthesis: Address,
    /// Where collected fees are sent.
    pub treasury: Address,
}

/// Every contract on a chain.
///
/// Cloning is how [`Chain::transact`] stages a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pub(crate) info: ChainInfo,
    pub(crate) access: AccessControl,
    pub(crate) ledger: TokenLedger,
    pub(crate) whitelist: Whitelist,
    pub(crate) book: AddressBook,
    pub(crate) registry: SynthRegistry,
    pub(crate) portal: PortalState,
    pub(crate) synthesis: SynthesisState,
    /// Inbound requests settled on this chain.
    pub(crate) settled: BTreeSet<RequestId>,
}

impl ChainState {
    fn new(info: ChainInfo, admin: Address) -> Self {
        let registry = SynthRegistry::new(info.synthesis, Amount::MAX);

        Self {
            info,
            access: AccessControl::new(admin),
            ledger: TokenLedger::default(),
            whitelist: Whitelist::default(),
            book: AddressBook::default(),
            registry,
            portal: PortalState::default(),
            synthesis: SynthesisState::default(),
            settled: BTreeSet::new(),
        }
    }

    /// Identity of the chain.
    pub const fn info(&self) -> &ChainInfo {
        &self.info
    }

    /// The chain id.
    pub const fn chain_id(&self) -> ChainId {
        self.info.chain_id
    }

    /// The permission set.
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Plain tokens.
    pub const fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Token policies.
    pub const fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Routing table.
    pub const fn address_book(&self) -> &AddressBook {
        &self.book
    }

    /// Synthetic tokens.
    pub const fn registry(&self) -> &SynthRegistry {
        &self.registry
    }

    /// Portal custody and wrapped representations.
    pub const fn portal_state(&self) -> &PortalState {
        &self.portal
    }

    /// Adapter bindings.
    pub const fn synthesis_state(&self) -> &SynthesisState {
        &self.synthesis
    }

    /// The Portal contract.
    pub fn portal(&mut self) -> Portal<'_> {
        Portal::new(self)
    }

    /// The Synthesis contract.
    pub fn synthesis(&mut self) -> Synthesis<'_> {
        Synthesis::new(self)
    }

    /// Whether an inbound request was settled on this chain.
    pub fn is_settled(&self, request_id: RequestId) -> bool {
        self.settled.contains(&request_id)
    }

    /// The balance of `holder` in a plain or synthetic token.
    pub fn balance_of(&self, token: Address, holder: Address) -> Amount {
        match self.registry.synth(token) {
            Ok(synth) => synth.balance_of(holder),
            Err(_) => self.ledger.balance_of(token, holder),
        }
    }

    /// Transfers a plain or synthetic token.
    pub fn transfer(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> BridgeResult<TxOutput> {
        if self.registry.contains(token) {
            self.registry.synth_mut(token)?.transfer(caller, to, amount)?;
        } else {
            self.ledger.transfer(token, caller, to, amount)?;
        }

        debug!(chain_id = %self.info.chain_id, %token, from = %caller, %to, %amount, "transfer");
        Ok(TxOutput::new())
    }

    /// Installs a token policy. Requires [`Role::Operator`].
    pub fn set_policy(
        &mut self,
        caller: Address,
        token: Address,
        policy: TokenPolicy,
    ) -> BridgeResult<TxOutput> {
        let event = self
            .whitelist
            .set_policy(&self.access, caller, token, policy)?;
        Ok(TxOutput::with_event(event))
    }

    /// Registers the bridge contracts of a chain. Admin only.
    pub fn set_route(
        &mut self,
        caller: Address,
        chain_id: ChainId,
        route: Route,
    ) -> BridgeResult<TxOutput> {
        let event = self.book.set_route(&self.access, caller, chain_id, route)?;
        Ok(TxOutput::with_event(event))
    }

    /// Sets the messaging endpoint. Admin only.
    pub fn set_messaging_endpoint(
        &mut self,
        caller: Address,
        endpoint: Address,
    ) -> BridgeResult<TxOutput> {
        self.book
            .set_messaging_endpoint(&self.access, caller, endpoint)?;
        Ok(TxOutput::new())
    }

    /// Grants a role. Admin only.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> BridgeResult<TxOutput> {
        self.access.grant(caller, role, account)?;
        Ok(TxOutput::new())
    }

    /// Registers a plain token. Admin only.
    pub fn register_token(&mut self, caller: Address, token: Token) -> BridgeResult<TxOutput> {
        self.access.require(caller, Role::Admin)?;

        let address = token.address();
        if !self.ledger.insert(token) {
            // Same address, same token: nothing to do.
            debug!(chain_id = %self.info.chain_id, token = %address, "token already registered");
        }
        Ok(TxOutput::new())
    }

    /// Hands an inbound request to the contract it is addressed to.
    ///
    /// A request id settles at most once: later deliveries of a settled id are authorized like
    /// any other but only produce [`BridgeEvent::Ignored`].
    pub fn on_receive(
        &mut self,
        caller: Address,
        destination_contract: Address,
        message: &InboundMessage,
    ) -> BridgeResult<TxOutput> {
        if destination_contract != self.info.portal && destination_contract != self.info.synthesis
        {
            return Err(BridgeError::RouteNotRegistered {
                chain_id: self.info.chain_id,
                contract: destination_contract,
            });
        }

        if self.settled.contains(&message.request_id) {
            self.book.require_endpoint(caller)?;
            return Ok(TxOutput::with_event(BridgeEvent::Ignored {
                request_id: message.request_id,
                contract: destination_contract,
            }));
        }

        let output = if destination_contract == self.info.portal {
            self.portal().on_receive(caller, message)?
        } else {
            self.synthesis().on_receive(caller, message)?
        };
        self.settled.insert(message.request_id);

        Ok(output)
    }
}

/// A chain executing transactions one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    state: ChainState,
}

impl Chain {
    /// Creates a chain with no tokens, routes or policies, administered by `admin`.
    pub fn new(info: ChainInfo, admin: Address) -> Self {
        Self {
            state: ChainState::new(info, admin),
        }
    }

    /// Adds a token before the chain starts executing transactions.
    pub fn with_token(mut self, token: Token) -> Self {
        self.state.ledger.insert(token);
        self
    }

    /// The chain id.
    pub const fn chain_id(&self) -> ChainId {
        self.state.info.chain_id
    }

    /// The committed state.
    pub const fn state(&self) -> &ChainState {
        &self.state
    }

    /// Runs `tx` against a copy of the state and commits the copy only if `tx` succeeds.
    pub fn transact<T>(
        &mut self,
        tx: impl FnOnce(&mut ChainState) -> BridgeResult<T>,
    ) -> BridgeResult<T> {
        let mut staged = self.state.clone();
        let result = tx(&mut staged)?;
        self.state = staged;
        Ok(result)
    }

    /// Delivers an inbound request as `caller`, logging the outcome.
    pub fn on_receive(
        &mut self,
        caller: Address,
        destination_contract: Address,
        message: &InboundMessage,
    ) -> BridgeResult<TxOutput> {
        let chain_id = self.chain_id();
        let result = self.transact(|state| state.on_receive(caller, destination_contract, message));

        match &result {
            Ok(output)
                if output
                    .events
                    .iter()
                    .any(|event| matches!(event, BridgeEvent::Ignored { .. })) =>
            {
                info!(%chain_id, request_id = %message.request_id, %destination_contract, "request already settled, ignored");
            }
            Ok(_) => {
                info!(%chain_id, request_id = %message.request_id, %destination_contract, "request settled");
            }
            Err(err) => {
                warn!(%chain_id, request_id = %message.request_id, %destination_contract, kind = ?err.kind(), %err, "request rejected");
            }
        }

        result
    }
}
