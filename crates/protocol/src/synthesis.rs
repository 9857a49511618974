//! The Synthesis: mint and burn of synthetic tokens.

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
    adapter::{Adapter, AdapterBinding, AdapterSpec},
    address_book::TrustedSource,
    chain::ChainState,
    errors::{BridgeError, BridgeResult},
    messaging::{InboundMessage, OutboundRequest},
    output::{BridgeDuty, BridgeEvent, FeeCredit, FeeReason, TxOutput},
};

const NAME: &str = "Synthesis";

/// Adapter bindings, keyed by synthetic token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisState {
    adapters: BTreeMap<Address, AdapterBinding>,
}

impl SynthesisState {
    /// The adapter bound to `synth`, if any.
    pub fn adapter(&self, synth: Address) -> Option<&AdapterBinding> {
        self.adapters.get(&synth)
    }
}

/// The Synthesis contract of a chain.
#[derive(Debug)]
pub struct Synthesis<'a> {
    state: &'a mut ChainState,
}

impl<'a> Synthesis<'a> {
    pub(crate) fn new(state: &'a mut ChainState) -> Self {
        Self { state }
    }

    fn address(&self) -> Address {
        self.state.info.synthesis
    }

    fn chain_id(&self) -> ChainId {
        self.state.info.chain_id
    }

    /// Burns `amount` of `synth` held by `sender` and requests the net amount on `destination`.
    ///
    /// The request unlocks the origin token when `destination` is the origin chain and mints
    /// the synthetic representation on `destination` otherwise. The fee is paid in synthetic
    /// tokens to the treasury.
    pub fn move_synth(
        &mut self,
        sender: Address,
        synth: Address,
        amount: Amount,
        recipient: Address,
        destination: ChainId,
    ) -> BridgeResult<TxOutput> {
        let token = self.state.registry.synth(synth)?;
        let (origin_token, origin_chain_id) = (token.origin_token(), token.origin_chain_id());
        let metadata = SynthMetadata {
            category: SynthCategory::Default,
            ..token.origin().clone()
        };

        let quote = self.state.whitelist.quote(origin_token, amount)?;
        let route = self.state.book.route_for(destination)?;
        let (action, destination_contract) = if destination == origin_chain_id {
            (BridgeAction::Unlock, route.portal)
        } else {
            (BridgeAction::Mint, route.synthesis)
        };

        self.debit(sender, synth, amount)?;

        let (synthesis, chain_id) = (self.address(), self.chain_id());
        let treasury = self.state.info.treasury;
        let token = self.state.registry.synth_mut(synth)?;
        if !quote.fee.is_zero() {
            token.transfer(sender, treasury, quote.fee)?;
        }
        token.burn(synthesis, sender, quote.net)?;

        let instruction = BridgeInstruction {
            action,
            token: origin_token,
            token_chain_id: origin_chain_id,
            amount: quote.net,
            recipient,
            origin_chain_id: chain_id,
            destination_chain_id: destination,
            metadata,
        };
        let request =
            OutboundRequest::new(chain_id, synthesis, destination_contract, &instruction)?;
        debug!(%chain_id, %sender, %synth, %instruction, fee = %quote.fee, "synthesis burned tokens");

        let mut output = TxOutput::new();
        output.push_event(BridgeEvent::Burned {
            synth,
            from: sender,
            amount: quote.net,
        });
        output.push_event(BridgeEvent::RequestSent {
            sender,
            destination_contract,
            instruction,
            fee: quote.fee,
            policy_version: self.state.whitelist.version(),
        });
        output.push_duty(BridgeDuty::SendRequest(request));
        if !quote.fee.is_zero() {
            output.push_duty(BridgeDuty::CreditTreasury(FeeCredit {
                chain_id,
                token: synth,
                amount: quote.fee,
                reason: FeeReason::Move,
            }));
        }

        Ok(output)
    }

    /// Burns `amount` of `synth` held by `sender` and releases the same amount of the origin
    /// token from the co-deployed Portal to `recipient`.
    ///
    /// Only possible when the origin token lives on this chain.
    pub fn burn(
        &mut self,
        sender: Address,
        synth: Address,
        amount: Amount,
        recipient: Address,
    ) -> BridgeResult<TxOutput> {
        let token = self.state.registry.synth(synth)?;
        let (origin_token, origin_chain_id) = (token.origin_token(), token.origin_chain_id());
        if origin_chain_id != self.chain_id() {
            return Err(BridgeError::LocalRedemptionUnavailable {
                synth,
                origin_chain_id,
            });
        }

        self.debit(sender, synth, amount)?;

        let synthesis = self.address();
        self.state
            .registry
            .synth_mut(synth)?
            .burn(synthesis, sender, amount)?;

        let state = &mut *self.state;
        state.portal.release(
            &mut state.ledger,
            state.info.portal,
            origin_token,
            recipient,
            amount,
        )?;
        debug!(chain_id = %state.info.chain_id, %sender, %synth, %recipient, %amount, "redeemed locally");

        let mut output = TxOutput::with_event(BridgeEvent::Burned {
            synth,
            from: sender,
            amount,
        });
        output.push_event(BridgeEvent::Redeemed {
            synth,
            token: origin_token,
            recipient,
            amount,
        });

        Ok(output)
    }

    /// Settles a mint request from a registered Portal or Synthesis, creating the synthetic token
    /// on first delivery.
    pub fn on_receive(
        &mut self,
        caller: Address,
        message: &InboundMessage,
    ) -> BridgeResult<TxOutput> {
        self.state.book.require_endpoint(caller)?;

        let instruction = BridgeInstruction::decode(&message.payload)?;
        let (synthesis, chain_id) = (self.address(), self.chain_id());
        if instruction.destination_chain_id != chain_id {
            return Err(BridgeError::WrongDestination {
                expected: chain_id,
                got: instruction.destination_chain_id,
            });
        }

        self.state.book.authorize_source(
            message.source_chain,
            message.source_contract,
            TrustedSource::PortalOrSynthesis,
        )?;
        if instruction.origin_chain_id != message.source_chain {
            return Err(BridgeError::RouteNotRegistered {
                chain_id: instruction.origin_chain_id,
                contract: message.source_contract,
            });
        }

        if instruction.action != BridgeAction::Mint {
            return Err(BridgeError::UnexpectedAction {
                contract: synthesis,
                action: instruction.action,
            });
        }

        let mut output = TxOutput::new();
        let resolved = self.state.registry.get_or_create(
            instruction.token,
            instruction.token_chain_id,
            &instruction.metadata,
        );
        if resolved.created {
            output.push_event(BridgeEvent::SynthCreated {
                synth: resolved.synth,
                origin_token: instruction.token,
                origin_chain_id: instruction.token_chain_id,
            });
        }

        self.credit(resolved.synth, instruction.recipient, instruction.amount)?;
        output.push_event(BridgeEvent::Settled {
            request_id: message.request_id,
            contract: synthesis,
            instruction,
        });

        Ok(output)
    }

    /// Mints `amount` to `recipient`, through the bound adapter if there is one.
    fn credit(&mut self, synth: Address, recipient: Address, amount: Amount) -> BridgeResult<()> {
        let synthesis = self.address();
        let state = &mut *self.state;
        let token = state.registry.synth_mut(synth)?;

        match state.synthesis.adapters.get_mut(&synth) {
            Some(adapter) => {
                let holder = adapter.core().address();
                token.mint(synthesis, holder, amount)?;
                let backing = token.balance_of(holder);
                adapter.mint(&mut state.ledger, backing, recipient, amount)?;
            }
            None => token.mint(synthesis, recipient, amount)?,
        }

        Ok(())
    }

    /// Leaves `amount` of `synth` in the hands of `holder`, converting it back from the adapter's
    /// external token first if one is bound.
    fn debit(&mut self, holder: Address, synth: Address, amount: Amount) -> BridgeResult<()> {
        let state = &mut *self.state;
        if let Some(adapter) = state.synthesis.adapters.get_mut(&synth) {
            adapter.burn(&mut state.ledger, holder, amount)?;
            let adapter_address = adapter.core().address();
            state
                .registry
                .synth_mut(synth)?
                .transfer(adapter_address, holder, amount)?;
        }

        Ok(())
    }

    /// Creates a synthetic token ahead of the first delivery. Admin only.
    ///
    /// Idempotent: an existing token is left as it is.
    pub fn create_synth(
        &mut self,
        caller: Address,
        origin_token: Address,
        origin_chain_id: ChainId,
        metadata: SynthMetadata,
        cap: Amount,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        let resolved = self
            .state
            .registry
            .get_or_create(origin_token, origin_chain_id, &metadata);
        if !resolved.created {
            return Ok(TxOutput::new());
        }

        let synthesis = self.address();
        let mut output = TxOutput::with_event(BridgeEvent::SynthCreated {
            synth: resolved.synth,
            origin_token,
            origin_chain_id,
        });
        let event = self
            .state
            .registry
            .synth_mut(resolved.synth)?
            .set_cap(synthesis, cap)?;
        output.push_event(event);

        Ok(output)
    }

    /// Changes the cap of a synthetic token. Admin only.
    pub fn set_synth_cap(
        &mut self,
        caller: Address,
        synth: Address,
        cap: Amount,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        let synthesis = self.address();
        let event = self
            .state
            .registry
            .synth_mut(synth)?
            .set_cap(synthesis, cap)?;
        debug!(chain_id = %self.chain_id(), %synth, %cap, "synth cap changed");

        Ok(TxOutput::with_event(event))
    }

    /// Binds an adapter to a synthetic token. Admin only.
    pub fn bind_adapter(
        &mut self,
        caller: Address,
        synth: Address,
        spec: &AdapterSpec,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        if let Some(existing) = self.state.synthesis.adapter(synth) {
            return Err(BridgeError::adapter(existing.name(), "already bound"));
        }

        let state = &mut *self.state;
        let token = state.registry.synth(synth)?;
        let adapter = AdapterBinding::bind(&mut state.ledger, token, spec)?;
        debug!(chain_id = %state.info.chain_id, %synth, adapter = adapter.name(), external = %spec.external_token, "adapter bound");
        state.synthesis.adapters.insert(synth, adapter);

        Ok(TxOutput::new())
    }

    /// Removes the adapter of a synthetic token. Admin only; the adapter must hold no backing.
    pub fn unbind_adapter(&mut self, caller: Address, synth: Address) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        let adapter = self.adapter(synth)?;
        let holder = adapter.core().address();
        let name = adapter.name();
        if !self.state.registry.synth(synth)?.balance_of(holder).is_zero() {
            return Err(BridgeError::adapter(name, "backing is not empty"));
        }

        self.state.synthesis.adapters.remove(&synth);
        debug!(chain_id = %self.chain_id(), %synth, adapter = name, "adapter unbound");
        Ok(TxOutput::new())
    }

    /// Changes the cap on an adapter's external supply. Admin only.
    pub fn set_adapter_cap(
        &mut self,
        caller: Address,
        synth: Address,
        cap: Amount,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        let adapter = self.adapter_mut(synth)?;
        let token = adapter.core().external_token();
        let old_cap = adapter.set_cap(cap)?;

        Ok(TxOutput::with_event(BridgeEvent::CapChanged {
            token,
            old_cap,
            new_cap: cap,
        }))
    }

    /// Pauses or resumes an adapter. Admin only.
    pub fn set_adapter_paused(
        &mut self,
        caller: Address,
        synth: Address,
        paused: bool,
    ) -> BridgeResult<TxOutput> {
        self.state.access.require(caller, Role::Admin)?;

        self.adapter_mut(synth)?.set_paused(paused);
        debug!(chain_id = %self.chain_id(), %synth, paused, "adapter pause toggled");
        Ok(TxOutput::new())
    }

    fn adapter(&self, synth: Address) -> BridgeResult<&AdapterBinding> {
        self.state
            .synthesis
            .adapter(synth)
            .ok_or_else(|| BridgeError::adapter(NAME, format!("no adapter bound to {synth}")))
    }

    fn adapter_mut(&mut self, synth: Address) -> BridgeResult<&mut AdapterBinding> {
        self.state
            .synthesis
            .adapters
            .get_mut(&synth)
            .ok_or_else(|| BridgeError::adapter(NAME, format!("no adapter bound to {synth}")))
    }
}

#[cfg(test)]
mod tests {
    use synth_bridge_primitives::types::RequestId;

    use super::*;
    use crate::{
        adapter::AdapterKind,
        address_book::Route,
        chain::Chain,
        errors::ErrorKind,
        testing::{
            deliver, home_chain, mint_message, one_token, origin_metadata, remote_chain, tokens,
            ADMIN, ALICE, BOB, HOME_CHAIN, HOME_PORTAL, HOME_SYNTHESIS, REMOTE_CHAIN,
            REMOTE_SYNTHESIS, REMOTE_TREASURY, TOKEN,
        },
    };

    const THIRD_CHAIN: ChainId = ChainId::new(137);
    const THIRD_SYNTHESIS: Address = Address::repeat_byte(0x32);
    const ADAPTER: Address = Address::repeat_byte(0xad);
    const SHARE: Address = Address::repeat_byte(0x1b);

    fn synth_of(chain: &Chain) -> Address {
        chain.state().registry().lookup(TOKEN, HOME_CHAIN)
    }

    /// A remote chain where [`BOB`] received 0.9 synthetic tokens.
    fn minted_chain() -> Chain {
        let mut chain = remote_chain();
        deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)).unwrap();
        chain
    }

    fn pool_spec(cap: Amount) -> AdapterSpec {
        AdapterSpec {
            kind: AdapterKind::Pool,
            address: ADAPTER,
            external_token: SHARE,
            external_decimals: 6,
            cap,
        }
    }

    /// A remote chain whose synthetic token is issued as 6-decimal pool shares.
    fn pooled_chain(cap: Amount) -> Chain {
        let mut chain = remote_chain();
        chain
            .transact(|s| {
                let created = s.synthesis().create_synth(
                    ADMIN,
                    TOKEN,
                    HOME_CHAIN,
                    origin_metadata(),
                    Amount::MAX,
                )?;
                let synth = s.registry().lookup(TOKEN, HOME_CHAIN);
                s.synthesis().bind_adapter(ADMIN, synth, &pool_spec(cap))?;
                Ok(created)
            })
            .unwrap();
        chain
    }

    #[test]
    fn first_delivery_creates_the_synth() {
        let mut chain = remote_chain();
        assert_eq!(synth_of(&chain), Address::ZERO);

        let output =
            deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)).unwrap();

        let synth = synth_of(&chain);
        assert!(matches!(
            output.events[0],
            BridgeEvent::SynthCreated { synth: created, .. } if created == synth
        ));
        assert!(matches!(output.events[1], BridgeEvent::Settled { .. }));

        let token = chain.state().registry().synth(synth).unwrap();
        assert_eq!(token.metadata().symbol, "sTKN(ETH)");
        assert_eq!(token.owner(), REMOTE_SYNTHESIS);
        assert_eq!(token.total_supply(), tokens(900, 3));
        assert_eq!(chain.state().balance_of(synth, BOB), tokens(900, 3));

        let mut second = mint_message(tokens(100, 3), ALICE);
        second.request_id = RequestId::new([2; 32]);
        let output = deliver(&mut chain, REMOTE_SYNTHESIS, &second).unwrap();
        assert_eq!(output.events.len(), 1);
        assert_eq!(synth_of(&chain), synth);
        assert_eq!(chain.state().registry().synths().count(), 1);
    }

    #[test]
    fn moving_back_to_the_origin_requests_an_unlock() {
        let mut chain = minted_chain();
        let synth = synth_of(&chain);

        let output = chain
            .transact(|s| {
                s.synthesis()
                    .move_synth(BOB, synth, tokens(450, 3), ALICE, HOME_CHAIN)
            })
            .unwrap();

        let request = output.requests().next().unwrap();
        assert_eq!(request.destination_contract, HOME_PORTAL);
        assert_eq!(request.destination_chain, HOME_CHAIN);
        let instruction = BridgeInstruction::decode(&request.payload).unwrap();
        assert_eq!(instruction.action, BridgeAction::Unlock);
        assert_eq!(instruction.token, TOKEN);
        assert_eq!(instruction.token_chain_id, HOME_CHAIN);
        assert_eq!(instruction.origin_chain_id, REMOTE_CHAIN);
        assert_eq!(instruction.amount, tokens(405, 3));

        let state = chain.state();
        assert_eq!(state.balance_of(synth, BOB), tokens(450, 3));
        assert_eq!(state.balance_of(synth, REMOTE_TREASURY), tokens(45, 3));
        assert_eq!(
            state.registry().synth(synth).unwrap().total_supply(),
            tokens(495, 3)
        );
        assert!(output.duties.iter().any(|duty| matches!(
            duty,
            BridgeDuty::CreditTreasury(FeeCredit { token, amount, reason: FeeReason::Move, .. })
                if *token == synth && *amount == tokens(45, 3)
        )));
    }

    #[test]
    fn moving_to_a_third_chain_requests_a_mint() {
        let mut chain = minted_chain();
        let synth = synth_of(&chain);
        chain
            .transact(|s| {
                s.set_route(
                    ADMIN,
                    THIRD_CHAIN,
                    Route {
                        portal: Address::repeat_byte(0x31),
                        synthesis: THIRD_SYNTHESIS,
                    },
                )
            })
            .unwrap();

        let output = chain
            .transact(|s| {
                s.synthesis()
                    .move_synth(BOB, synth, tokens(900, 3), ALICE, THIRD_CHAIN)
            })
            .unwrap();

        let request = output.requests().next().unwrap();
        assert_eq!(request.destination_contract, THIRD_SYNTHESIS);
        let instruction = BridgeInstruction::decode(&request.payload).unwrap();
        assert_eq!(instruction.action, BridgeAction::Mint);
        assert_eq!(instruction.token_chain_id, HOME_CHAIN);
        assert_eq!(instruction.origin_chain_id, REMOTE_CHAIN);
        assert_eq!(instruction.metadata, origin_metadata());
    }

    #[test]
    fn moving_more_than_held_fails_cleanly() {
        let mut chain = minted_chain();
        let synth = synth_of(&chain);
        let before = chain.state().clone();

        let err = chain
            .transact(|s| {
                s.synthesis()
                    .move_synth(BOB, synth, one_token(), ALICE, HOME_CHAIN)
            })
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(chain.state(), &before);
        assert_eq!(
            chain.transact(|s| s
                .synthesis()
                .move_synth(BOB, TOKEN, one_token(), ALICE, HOME_CHAIN)),
            Err(BridgeError::UnknownSynth(TOKEN))
        );
    }

    #[test]
    fn only_trusted_sources_mint() {
        let mut chain = remote_chain();

        let mut spoofed = mint_message(one_token(), BOB);
        spoofed.source_contract = ALICE;
        assert!(matches!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &spoofed),
            Err(BridgeError::RouteNotRegistered { contract, .. }) if contract == ALICE
        ));

        // A registered contract cannot claim to speak for another chain.
        let mut relabeled = mint_message(one_token(), BOB);
        let mut instruction = BridgeInstruction::decode(&relabeled.payload).unwrap();
        instruction.origin_chain_id = THIRD_CHAIN;
        relabeled.payload = instruction.encode().unwrap();
        assert_eq!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &relabeled).unwrap_err().kind(),
            ErrorKind::RouteNotRegistered
        );

        let mut unlock = mint_message(one_token(), BOB);
        let mut instruction = BridgeInstruction::decode(&unlock.payload).unwrap();
        instruction.action = BridgeAction::Unlock;
        unlock.payload = instruction.encode().unwrap();
        assert_eq!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &unlock),
            Err(BridgeError::UnexpectedAction {
                contract: REMOTE_SYNTHESIS,
                action: BridgeAction::Unlock
            })
        );

        assert!(matches!(
            chain.on_receive(BOB, REMOTE_SYNTHESIS, &mint_message(one_token(), BOB)),
            Err(BridgeError::Unauthorized {
                role: Role::MessagingEndpoint,
                ..
            })
        ));
        assert_eq!(synth_of(&chain), Address::ZERO);
    }

    #[test]
    fn delivery_over_the_cap_fails_until_the_cap_is_raised() {
        let mut chain = remote_chain();
        chain
            .transact(|s| {
                s.synthesis().create_synth(
                    ADMIN,
                    TOKEN,
                    HOME_CHAIN,
                    origin_metadata(),
                    tokens(500, 3),
                )
            })
            .unwrap();
        let synth = synth_of(&chain);
        let before = chain.state().clone();
        let message = mint_message(tokens(900, 3), BOB);

        assert_eq!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &message),
            Err(BridgeError::CapExceeded {
                token: synth,
                supply: Amount::ZERO,
                amount: tokens(900, 3),
                cap: tokens(500, 3),
            })
        );
        assert_eq!(chain.state(), &before);

        assert!(chain
            .transact(|s| s.synthesis().set_synth_cap(BOB, synth, one_token()))
            .is_err());
        chain
            .transact(|s| s.synthesis().set_synth_cap(ADMIN, synth, one_token()))
            .unwrap();
        deliver(&mut chain, REMOTE_SYNTHESIS, &message).unwrap();
        assert_eq!(chain.state().balance_of(synth, BOB), tokens(900, 3));
    }

    #[test]
    fn creating_an_existing_synth_changes_nothing() {
        let mut chain = minted_chain();
        let before = chain.state().clone();

        let output = chain
            .transact(|s| {
                s.synthesis()
                    .create_synth(ADMIN, TOKEN, HOME_CHAIN, origin_metadata(), Amount::ZERO)
            })
            .unwrap();

        assert!(output.events.is_empty());
        assert_eq!(chain.state(), &before);
        assert!(matches!(
            chain.transact(|s| s.synthesis().create_synth(
                BOB,
                Address::repeat_byte(9),
                HOME_CHAIN,
                origin_metadata(),
                Amount::MAX
            )),
            Err(BridgeError::Unauthorized { role: Role::Admin, .. })
        ));
    }

    #[test]
    fn adapters_issue_and_redeem_external_tokens() {
        let mut chain = pooled_chain(Amount::MAX);
        let synth = synth_of(&chain);

        deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)).unwrap();
        assert_eq!(chain.state().balance_of(SHARE, BOB), Amount::new(900_000));
        assert_eq!(chain.state().balance_of(synth, BOB), Amount::ZERO);
        assert_eq!(chain.state().balance_of(synth, ADAPTER), tokens(900, 3));

        let output = chain
            .transact(|s| {
                s.synthesis()
                    .move_synth(BOB, synth, tokens(450, 3), ALICE, HOME_CHAIN)
            })
            .unwrap();

        let instruction =
            BridgeInstruction::decode(&output.requests().next().unwrap().payload).unwrap();
        assert_eq!(instruction.amount, tokens(405, 3));
        let state = chain.state();
        assert_eq!(state.balance_of(SHARE, BOB), Amount::new(450_000));
        assert_eq!(state.balance_of(synth, ADAPTER), tokens(450, 3));
        assert_eq!(state.balance_of(synth, REMOTE_TREASURY), tokens(45, 3));
        assert_eq!(
            state.synthesis_state().adapter(synth).unwrap().core().issued(),
            Amount::new(450_000)
        );
    }

    #[test]
    fn adapter_cap_and_pause_block_delivery() {
        let mut chain = pooled_chain(Amount::new(500_000));
        let synth = synth_of(&chain);
        let before = chain.state().clone();

        assert_eq!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)),
            Err(BridgeError::CapExceeded {
                token: SHARE,
                supply: Amount::ZERO,
                amount: Amount::new(900_000),
                cap: Amount::new(500_000),
            })
        );
        assert_eq!(chain.state(), &before);

        chain
            .transact(|s| {
                s.synthesis()
                    .set_adapter_cap(ADMIN, synth, Amount::new(1_000_000))?;
                s.synthesis().set_adapter_paused(ADMIN, synth, true)
            })
            .unwrap();
        assert_eq!(
            deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)),
            Err(BridgeError::AdapterPaused {
                adapter: "PoolAdapter".into()
            })
        );

        chain
            .transact(|s| s.synthesis().set_adapter_paused(ADMIN, synth, false))
            .unwrap();
        deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)).unwrap();
        assert_eq!(
            chain.transact(|s| s.synthesis().set_adapter_cap(ADMIN, synth, Amount::new(1))),
            Err(BridgeError::CapBelowSupply {
                token: SHARE,
                cap: Amount::new(1),
                supply: Amount::new(900_000),
            })
        );
    }

    #[test]
    fn adapters_unbind_only_without_backing() {
        let mut chain = pooled_chain(Amount::MAX);
        let synth = synth_of(&chain);
        deliver(&mut chain, REMOTE_SYNTHESIS, &mint_message(tokens(900, 3), BOB)).unwrap();

        assert_eq!(
            chain.transact(|s| s.synthesis().unbind_adapter(ADMIN, synth)),
            Err(BridgeError::adapter("PoolAdapter", "backing is not empty"))
        );
        assert_eq!(
            chain.transact(|s| s.synthesis().bind_adapter(ADMIN, synth, &pool_spec(Amount::MAX))),
            Err(BridgeError::adapter("PoolAdapter", "already bound"))
        );

        chain
            .transact(|s| {
                s.synthesis()
                    .move_synth(BOB, synth, tokens(900, 3), ALICE, HOME_CHAIN)
            })
            .unwrap();
        chain
            .transact(|s| s.synthesis().unbind_adapter(ADMIN, synth))
            .unwrap();
        assert!(chain.state().synthesis_state().adapter(synth).is_none());

        // Without an adapter, deliveries mint the synthetic token directly.
        let mut again = mint_message(tokens(100, 3), BOB);
        again.request_id = RequestId::new([3; 32]);
        deliver(&mut chain, REMOTE_SYNTHESIS, &again).unwrap();
        assert_eq!(chain.state().balance_of(synth, BOB), tokens(100, 3));
    }

    #[test]
    fn synths_of_local_tokens_redeem_on_the_spot() {
        let mut chain = home_chain();
        chain
            .transact(|s| s.transfer(ALICE, TOKEN, HOME_PORTAL, one_token()))
            .unwrap();
        let output = chain
            .transact(|s| {
                s.portal()
                    .synthesize(ALICE, TOKEN, one_token(), BOB, HOME_CHAIN)
            })
            .unwrap();
        let request = output.requests().next().unwrap();
        assert_eq!(request.destination_contract, HOME_SYNTHESIS);
        let message = InboundMessage::from_request(RequestId::new([4; 32]), request);
        deliver(&mut chain, HOME_SYNTHESIS, &message).unwrap();

        let synth = synth_of(&chain);
        let output = chain
            .transact(|s| s.synthesis().burn(BOB, synth, tokens(900, 3), ALICE))
            .unwrap();

        assert!(output.events.iter().any(|e| matches!(
            e,
            BridgeEvent::Redeemed { recipient, .. } if *recipient == ALICE
        )));
        let state = chain.state();
        assert_eq!(state.balance_of(synth, BOB), Amount::ZERO);
        assert_eq!(state.portal_state().custody(TOKEN), Amount::ZERO);
        assert_eq!(
            state.balance_of(TOKEN, ALICE),
            tokens(999_900, 3)
        );
    }

    #[test]
    fn remote_synths_cannot_redeem_locally() {
        let mut chain = minted_chain();
        let synth = synth_of(&chain);

        assert_eq!(
            chain.transact(|s| s.synthesis().burn(BOB, synth, tokens(1, 3), BOB)),
            Err(BridgeError::LocalRedemptionUnavailable {
                synth,
                origin_chain_id: HOME_CHAIN
            })
        );
    }
}
