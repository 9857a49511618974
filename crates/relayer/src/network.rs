//! The chains of a deployment and the duties their transactions emit.

use std::{collections::BTreeMap, sync::Arc};

use synth_bridge_db::ledger::RequestEnvelope;
use synth_bridge_params::prelude::{
    AdapterKind as AdapterParamsKind, AdapterParams, ChainParams, DeploymentParams, ParamsError,
};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    types::{ChainId, SynthCategory, SynthMetadata},
};
use synth_bridge_protocol::{
    adapter::{AdapterKind, AdapterSpec},
    address_book::Route,
    chain::{Chain, ChainInfo, ChainState},
    errors::{BridgeError, BridgeResult},
    ledger::Token,
    messaging::{InboundMessage, MessagingEndpoint},
    output::{BridgeDuty, TxOutput},
    treasury::{InMemoryTreasury, Treasury},
    whitelist::TokenPolicy,
};
use tracing::{debug, info};

use crate::{
    endpoint::LocalEndpoint,
    errors::{RelayError, RelayResult},
};

/// Every chain of a deployment plus the collaborators that execute their duties.
#[derive(Debug, Default)]
pub struct Network {
    chains: BTreeMap<ChainId, Chain>,
    endpoint: Arc<LocalEndpoint>,
    treasury: Arc<InMemoryTreasury>,
}

impl Network {
    /// Creates a network with no chains.
    pub fn new(endpoint: Arc<LocalEndpoint>, treasury: Arc<InMemoryTreasury>) -> Self {
        Self {
            chains: BTreeMap::new(),
            endpoint,
            treasury,
        }
    }

    /// Boots every chain described by `params`.
    ///
    /// Each chain gets its tokens, a route to every chain of the deployment (itself included), its
    /// messaging endpoint, its policies and its adapters.
    pub fn from_params(params: &DeploymentParams) -> RelayResult<Self> {
        params.validate()?;

        let mut network = Self::default();
        for chain_params in &params.chains {
            network.add_chain(genesis(params, chain_params)?);
        }

        info!(chains = network.chains.len(), "network booted");
        Ok(network)
    }

    /// Adds a chain, replacing any chain with the same id.
    pub fn add_chain(&mut self, chain: Chain) {
        self.chains.insert(chain.chain_id(), chain);
    }

    /// Looks up a chain.
    pub fn chain(&self, chain_id: ChainId) -> RelayResult<&Chain> {
        self.chains
            .get(&chain_id)
            .ok_or(RelayError::UnknownChain(chain_id))
    }

    fn chain_mut(&mut self, chain_id: ChainId) -> RelayResult<&mut Chain> {
        self.chains
            .get_mut(&chain_id)
            .ok_or(RelayError::UnknownChain(chain_id))
    }

    /// Ids of all chains.
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chains.keys().copied()
    }

    /// The endpoint queuing outbound requests.
    pub fn endpoint(&self) -> &LocalEndpoint {
        &self.endpoint
    }

    /// Fees credited so far.
    pub fn treasury(&self) -> &InMemoryTreasury {
        &self.treasury
    }

    /// Runs `tx` on `chain_id` and executes its duties once it has committed.
    pub fn execute(
        &mut self,
        chain_id: ChainId,
        tx: impl FnOnce(&mut ChainState) -> BridgeResult<TxOutput>,
    ) -> RelayResult<TxOutput> {
        let output = self
            .chain_mut(chain_id)?
            .transact(tx)
            .map_err(|source| RelayError::Bridge { chain_id, source })?;

        self.dispatch(&output);
        Ok(output)
    }

    /// Hands a request to its destination contract as the destination chain's messaging endpoint.
    pub fn deliver(&mut self, envelope: &RequestEnvelope) -> RelayResult<TxOutput> {
        let chain_id = envelope.destination_chain;
        let chain = self.chain_mut(chain_id)?;

        let caller = chain.state().address_book().messaging_endpoint();
        let message = InboundMessage {
            request_id: envelope.request_id,
            source_chain: envelope.source_chain,
            source_contract: envelope.source_contract,
            payload: envelope.payload.clone(),
        };
        let output = chain
            .on_receive(caller, envelope.destination_contract, &message)
            .map_err(|source| RelayError::Bridge { chain_id, source })?;

        self.dispatch(&output);
        Ok(output)
    }

    fn dispatch(&self, output: &TxOutput) {
        for duty in &output.duties {
            match duty {
                BridgeDuty::SendRequest(request) => {
                    self.endpoint.send(request.clone());
                }
                BridgeDuty::CreditTreasury(credit) => self.treasury.credit(credit),
            }
        }
    }

    /// The balance of `holder` in a plain or synthetic token on `chain_id`.
    pub fn balance_of(
        &self,
        chain_id: ChainId,
        token: Address,
        holder: Address,
    ) -> RelayResult<Amount> {
        Ok(self.chain(chain_id)?.state().balance_of(token, holder))
    }

    /// The synthetic token representing `origin_token` on `chain_id`, or [`Address::ZERO`].
    pub fn synth_of(
        &self,
        chain_id: ChainId,
        origin_token: Address,
        origin_chain_id: ChainId,
    ) -> RelayResult<Address> {
        Ok(self
            .chain(chain_id)?
            .state()
            .registry()
            .lookup(origin_token, origin_chain_id))
    }

    /// Origin tokens the Portal of `origin_chain_id` holds on behalf of synthetic supply.
    pub fn custody(&self, origin_chain_id: ChainId, origin_token: Address) -> RelayResult<Amount> {
        Ok(self
            .chain(origin_chain_id)?
            .state()
            .portal_state()
            .custody(origin_token))
    }

    /// Synthetic supply of `origin_token` summed over every chain.
    pub fn synthetic_supply(
        &self,
        origin_token: Address,
        origin_chain_id: ChainId,
    ) -> RelayResult<Amount> {
        self.chains.values().try_fold(Amount::ZERO, |total, chain| {
            let registry = chain.state().registry();
            let supply = registry
                .synth(registry.lookup(origin_token, origin_chain_id))
                .map(|synth| synth.total_supply())
                .unwrap_or_default();

            total.checked_add(supply).ok_or(RelayError::Bridge {
                chain_id: chain.chain_id(),
                source: BridgeError::Overflow("synthetic supply"),
            })
        })
    }
}

/// Builds a chain in its boot state.
fn genesis(params: &DeploymentParams, chain_params: &ChainParams) -> RelayResult<Chain> {
    let chain_id = chain_params.chain_id;
    let admin = chain_params.admin;
    let rejected = |source| RelayError::Bridge { chain_id, source };

    let info = ChainInfo {
        chain_id,
        symbol: chain_params.symbol.clone(),
        portal: chain_params.portal,
        synthesis: chain_params.synthesis,
        treasury: chain_params.treasury,
    };
    let mut chain = Chain::new(info, admin);

    for token_params in params.tokens.iter().filter(|t| t.chain_id == chain_id) {
        let mut token = Token::new(
            token_params.address,
            token_params.metadata(),
            token_params.minter,
        );
        for balance in &token_params.balances {
            token = token
                .with_balance(balance.holder, balance.amount)
                .map_err(rejected)?;
        }
        chain = chain.with_token(token);
    }

    let adapters = params
        .adapters
        .iter()
        .filter(|adapter| adapter.chain_id == chain_id)
        .map(|adapter| Ok((adapter, adapted_metadata(params, adapter)?)))
        .collect::<RelayResult<Vec<_>>>()?;

    chain
        .transact(|state| {
            for peer in &params.chains {
                let route = Route {
                    portal: peer.portal,
                    synthesis: peer.synthesis,
                };
                state.set_route(admin, peer.chain_id, route)?;
            }
            state.set_messaging_endpoint(admin, chain_params.endpoint)?;

            for policy in params.policies.iter().filter(|p| p.chain_id == chain_id) {
                let token_policy = TokenPolicy {
                    min: policy.min,
                    max: policy.max,
                    fee_bps: policy.fee_bps,
                    enabled: policy.enabled,
                };
                state.set_policy(admin, policy.token, token_policy)?;
            }

            for (adapter, metadata) in adapters {
                install_adapter(state, admin, adapter, metadata)?;
            }

            Ok(())
        })
        .map_err(rejected)?;

    debug!(%chain_id, symbol = %chain_params.symbol, "chain booted");
    Ok(chain)
}

/// Metadata of the synthetic token an adapter is bound to.
fn adapted_metadata(
    params: &DeploymentParams,
    adapter: &AdapterParams,
) -> RelayResult<SynthMetadata> {
    let unknown = || ParamsError::UnknownToken {
        chain_id: adapter.origin_chain_id,
        token: adapter.origin_token,
        context: "adapter".to_string(),
    };
    let token = params
        .token(adapter.origin_chain_id, adapter.origin_token)
        .ok_or_else(unknown)?;
    let origin_chain = params
        .chain(adapter.origin_chain_id)
        .ok_or_else(unknown)?;

    let category = match adapter.kind {
        AdapterParamsKind::Pool => SynthCategory::Custom,
        AdapterParamsKind::ThirdParty => SynthCategory::ThirdParty,
    };

    Ok(SynthMetadata {
        token: token.metadata(),
        origin_chain_symbol: origin_chain.symbol.clone(),
        category,
    })
}

fn install_adapter(
    state: &mut ChainState,
    admin: Address,
    adapter: &AdapterParams,
    metadata: SynthMetadata,
) -> BridgeResult<()> {
    state.synthesis().create_synth(
        admin,
        adapter.origin_token,
        adapter.origin_chain_id,
        metadata,
        Amount::MAX,
    )?;
    let synth = state
        .registry()
        .lookup(adapter.origin_token, adapter.origin_chain_id);

    let spec = AdapterSpec {
        kind: match adapter.kind {
            AdapterParamsKind::Pool => AdapterKind::Pool,
            AdapterParamsKind::ThirdParty => AdapterKind::ThirdParty,
        },
        address: adapter.address,
        external_token: adapter.external_token,
        external_decimals: adapter.external_decimals,
        cap: adapter.cap,
    };
    state.synthesis().bind_adapter(admin, synth, &spec)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use synth_bridge_params::default::{
        DEVNET_FAUCET, DEVNET_HOME_CHAIN, DEVNET_REMOTE_CHAIN, DEVNET_TOKEN,
    };
    use synth_bridge_protocol::errors::ErrorKind;

    use super::*;

    #[test]
    fn devnet_boots_fully_connected() {
        let params = DeploymentParams::devnet();
        let network = Network::from_params(&params).unwrap();

        assert_eq!(network.chain_ids().count(), 3);
        for chain_id in network.chain_ids() {
            let state = network.chain(chain_id).unwrap().state();
            for peer in &params.chains {
                assert_eq!(
                    state.address_book().route_for(peer.chain_id).unwrap().synthesis,
                    peer.synthesis
                );
            }
            assert!(state.whitelist().policy(DEVNET_TOKEN).is_some());
        }

        assert_eq!(
            network
                .balance_of(DEVNET_HOME_CHAIN, DEVNET_TOKEN, DEVNET_FAUCET)
                .unwrap(),
            Amount::from_units(1_000_000, 18).unwrap()
        );
        assert_eq!(
            network
                .synth_of(DEVNET_REMOTE_CHAIN, DEVNET_TOKEN, DEVNET_HOME_CHAIN)
                .unwrap(),
            Address::ZERO
        );
    }

    #[test]
    fn failed_transactions_emit_no_duties() {
        let mut network = Network::from_params(&DeploymentParams::devnet()).unwrap();

        let err = network
            .execute(DEVNET_HOME_CHAIN, |state| {
                state.portal().synthesize(
                    DEVNET_FAUCET,
                    DEVNET_TOKEN,
                    Amount::new(10),
                    DEVNET_FAUCET,
                    DEVNET_REMOTE_CHAIN,
                )
            })
            .unwrap_err();

        assert_eq!(
            err.bridge_error().map(BridgeError::kind),
            Some(ErrorKind::InsufficientLockedBalance)
        );
        assert!(network.endpoint().is_empty());
        assert!(matches!(
            network.execute(ChainId::new(9), |_| Ok(TxOutput::new())),
            Err(RelayError::UnknownChain(_))
        ));
    }
}
