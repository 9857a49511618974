//! The Portal: custody of origin tokens on their home chain.

use std::collections::BTreeMap;

use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    instruction::{BridgeAction, BridgeInstruction},
    types::{ChainId, SynthCategory, SynthMetadata},
};
use tracing::debug;

use crate::{
    access::Role,
    address_book::TrustedSource,
    chain::ChainState,
    errors::{BridgeError, BridgeResult},
    ledger::TokenLedger,
    messaging::{InboundMessage, OutboundRequest},
    output::{BridgeDuty, BridgeEvent, FeeCredit, FeeReason, TxOutput},
};

/// What the Portal keeps track of besides the token balances it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalState {
    /// Origin tokens backing synthetic supply elsewhere.
    custody: BTreeMap<Address, Amount>,
    /// Wrapped representation minted when custody runs dry, per origin token.
    wrapped: BTreeMap<Address, Address>,
}

impl PortalState {
    /// Origin tokens held on behalf of synthetic supply elsewhere.
    pub fn custody(&self, token: Address) -> Amount {
        self.custody.get(&token).copied().unwrap_or_default()
    }

    /// The wrapped representation bound to `token`, if any.
    pub fn wrapped_representation(&self, token: Address) -> Option<Address> {
        self.wrapped.get(&token).copied()
    }

    fn account(&mut self, token: Address, amount: Amount) -> BridgeResult<()> {
        let custody = self
            .custody(token)
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("portal custody"))?;
        self.custody.insert(token, custody);
        Ok(())
    }

    /// Releases `amount` of `token` from custody to `to`.
    pub(crate) fn release(
        &mut self,
        ledger: &mut TokenLedger,
        portal: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> BridgeResult<()> {
        let custody = self.custody(token);
        let remaining = custody
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientCustody {
                token,
                custody,
                amount,
            })?;

        ledger.transfer(token, portal, to, amount)?;
        self.custody.insert(token, remaining);
        Ok(())
    }
}

/// The Portal contract of a chain.
#[derive(Debug)]
pub struct Portal<'a> {
    state: &'a mut ChainState,
}

impl<'a> Portal<'a> {
    pub(crate) fn new(state: &'a mut ChainState) -> Self {
        Self { state }
    }

    fn address(&self) -> Address {
        self.state.info.portal
    }

    fn chain_id(&self) -> ChainId {
        self.state.info.chain_id
    }

    /// Tokens transferred to the Portal that no request has claimed yet.
    pub fn locked_balance(&self, token: Address) -> Amount {
        let held = self.state.ledger.balance_of(token, self.address());
        held.saturating_sub(self.state.portal.custody(token))
    }

    /// Turns `amount` of `token`, already transferred to the Portal by `sender`, into a mint
    /// request for the Synthesis on `destination`.
    ///
    /// The fee stays on this chain and goes to the treasury; only the net amount is taken into
    /// custody and minted remotely.
    pub fn synthesize(
        &mut self,
        sender: Address,
        token: Address,
        amount: Amount,
        recipient: Address,
        destination: ChainId,
    ) -> BridgeResult<TxOutput> {
        let quote = self.state.whitelist.quote(token, amount)?;
        let metadata = self.state.ledger.token(token)?.metadata().clone();
        let route = self.state.book.route_for(destination)?;

        let locked = self.locked_balance(token);
        if locked < amount {
            return Err(BridgeError::InsufficientLockedBalance {
                token,
                locked,
                amount,
            });
        }

        let (portal, chain_id) = (self.address(), self.chain_id());
        let treasury = self.state.info.treasury;
        if !quote.fee.is_zero() {
            self.state
                .ledger
                .transfer(token, portal, treasury, quote.fee)?;
        }
        self.state.portal.account(token, quote.net)?;

        let instruction = BridgeInstruction {
            action: BridgeAction::Mint,
            token,
            token_chain_id: chain_id,
            amount: quote.net,
            recipient,
            origin_chain_id: chain_id,
            destination_chain_id: destination,
            metadata: SynthMetadata {
                token: metadata,
                origin_chain_symbol: self.state.info.symbol.clone(),
                category: SynthCategory::Default,
            },
        };
        let request = OutboundRequest::new(chain_id, portal, route.synthesis, &instruction)?;
        debug!(%chain_id, %sender, %instruction, fee = %quote.fee, "portal locked tokens");

        let mut output = TxOutput::new();
        output.push_event(BridgeEvent::RequestSent {
            sender,
            destination_contract: route.synthesis,
            instruction,
            fee: quote.fee,
            policy_version: self.state.whitelist.version(),
        });
        output.push_duty(BridgeDuty::SendRequest(request));
        if !quote.fee.is_zero() {
            output.push_duty(BridgeDuty::CreditTreasury(FeeCredit {
                chain_id,
                token,
                amount: quote.fee,
                reason: FeeReason::Synthesize,
            }));
        }

        Ok(output)
    }

    /// Settles an unlock request from a registered Synthesis.
    ///
    /// Custody is released when it covers the amount. Otherwise the wrapped representation is
    /// minted if one is bound, and the request fails with
    /// [`BridgeError::InsufficientCustody`] if not.
    pub fn on_receive(
        &mut self,
        caller: Address,
        message: &InboundMessage,
    ) -> BridgeResult<TxOutput> {
        self.state.book.require_endpoint(caller)?;

        let instruction = BridgeInstruction::decode(&message.payload)?;
        let (portal, chain_id) = (self.address(), self.chain_id());
        if instruction.destination_chain_id != chain_id {
            return Err(BridgeError::WrongDestination {
                expected: chain_id,
                got: instruction.destination_chain_id,
            });
        }

        self.state.book.authorize_source(
            message.source_chain,
            message.source_contract,
            TrustedSource::Synthesis,
        )?;
        if instruction.origin_chain_id != message.source_chain {
            return Err(BridgeError::RouteNotRegistered {
                chain_id: instruction.origin_chain_id,
                contract: message.source_contract,
            });
        }

        if instruction.action != BridgeAction::Unlock {
            return Err(BridgeError::UnexpectedAction {
                contract: portal,
                action: instruction.action,
            });
        }
        if instruction.token_chain_id != chain_id {
            return Err(BridgeError::UnknownToken(instruction.token));
        }
        self.state.ledger.token(instruction.token)?;

        let (token, recipient, amount) = (
            instruction.token,
            instruction.recipient,
            instruction.amount,
        );

        let mut output = TxOutput::new();
        let custody = self.state.portal.custody(token);
        if custody >= amount {
            self.state
                .portal
                .release(&mut self.state.ledger, portal, token, recipient, amount)?;
            output.push_event(BridgeEvent::Unlocked {
                token,
                recipient,
                amount,
            });
        } else if let Some(wrapped) = self.state.portal.wrapped_representation(token) {
            self.state.ledger.mint(portal, wrapped, recipient, amount)?;
            debug!(%chain_id, %token, %wrapped, %custody, %amount, "custody short, minted wrapped representation");
            output.push_event(BridgeEvent::WrappedMinted {
                token,
                wrapped,
                recipient,
                amount,
            });
        } else {
            return Err(BridgeError::InsufficientCustody {
                token,
                custody,
                amount,
            });
        }

        output.push_event(BridgeEvent::Settled {
            request_id: message.request_id,
            contract: portal,
            instruction,
        });

        Ok(output)
    }

    /// Binds the wrapped representation minted when custody of `token` is insufficient.
    /// Admin only; the Portal must be the wrapped token's minter.
    pub fn set_wrapped_representation(
        &mut self,
        caller: Address,
        token: Address,
        wrapped: Address,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;
        self.state.ledger.token(token)?;

        let portal = self.address();
        if self.state.ledger.token(wrapped)?.minter() != Some(portal) {
            return Err(BridgeError::Unauthorized {
                caller: portal,
                role: Role::Minter,
            });
        }

        self.state.portal.wrapped.insert(token, wrapped);
        debug!(chain_id = %self.chain_id(), %token, %wrapped, "wrapped representation bound");
        Ok(TxOutput::new())
    }
}
