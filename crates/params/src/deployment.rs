//! The full description of a bridge deployment.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{address::Address, amount::Amount, types::ChainId};

use crate::{
    adapter::AdapterParams,
    chain::ChainParams,
    default::{
        DEFAULT_FEE_BPS, DEVNET_FAUCET, DEVNET_FAUCET_SUPPLY, DEVNET_HOME_CHAIN,
        DEVNET_MAX_TRANSFER, DEVNET_OTHER_CHAIN, DEVNET_REMOTE_CHAIN, DEVNET_TOKEN,
        DEVNET_TOKEN_DECIMALS,
    },
    errors::{ParamsError, ParamsResult},
    policy::PolicyParams,
    token::{BalanceParams, TokenParams},
};

/// Everything needed to boot a set of bridged chains.
///
/// Every chain's Portal and Synthesis are registered as trusted peers on every other chain, so the
/// routes are implied by [`Self::chains`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentParams {
    /// The participating chains.
    pub chains: Vec<ChainParams>,

    /// Origin tokens.
    #[serde(default)]
    pub tokens: Vec<TokenParams>,

    /// Whitelist entries.
    #[serde(default)]
    pub policies: Vec<PolicyParams>,

    /// Adapter bindings.
    #[serde(default)]
    pub adapters: Vec<AdapterParams>,
}

impl DeploymentParams {
    /// Looks up the parameters of a chain.
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainParams> {
        self.chains.iter().find(|chain| chain.chain_id == chain_id)
    }

    /// Looks up an origin token.
    pub fn token(&self, chain_id: ChainId, address: Address) -> Option<&TokenParams> {
        self.tokens
            .iter()
            .find(|token| token.chain_id == chain_id && token.address == address)
    }

    /// Checks that the parameters are internally consistent.
    pub fn validate(&self) -> ParamsResult<()> {
        let mut chain_ids = BTreeSet::new();
        for chain in &self.chains {
            if !chain_ids.insert(chain.chain_id) {
                return Err(ParamsError::DuplicateChain(chain.chain_id));
            }
            chain.validate()?;
        }

        let mut tokens = BTreeSet::new();
        for token in &self.tokens {
            self.require_chain(token.chain_id, "token")?;
            if !tokens.insert((token.chain_id, token.address)) {
                return Err(ParamsError::DuplicateToken {
                    chain_id: token.chain_id,
                    token: token.address,
                });
            }
        }

        for policy in &self.policies {
            self.require_chain(policy.chain_id, "policy")?;
            // The token must exist somewhere; a policy on a remote chain refers to the origin.
            if !self.tokens.iter().any(|t| t.address == policy.token) {
                return Err(ParamsError::UnknownToken {
                    chain_id: policy.chain_id,
                    token: policy.token,
                    context: "policy".to_string(),
                });
            }
            policy.validate()?;
        }

        for adapter in &self.adapters {
            self.require_chain(adapter.chain_id, "adapter")?;
            self.require_chain(adapter.origin_chain_id, "adapter origin")?;
            if self.token(adapter.origin_chain_id, adapter.origin_token).is_none() {
                return Err(ParamsError::UnknownToken {
                    chain_id: adapter.origin_chain_id,
                    token: adapter.origin_token,
                    context: "adapter".to_string(),
                });
            }
        }

        Ok(())
    }

    fn require_chain(&self, chain_id: ChainId, context: &str) -> ParamsResult<()> {
        if self.chain(chain_id).is_none() {
            return Err(ParamsError::UnknownChain {
                chain_id,
                context: context.to_string(),
            });
        }

        Ok(())
    }

    /// A three-chain development deployment with one origin token on the home chain that may be
    /// moved freely between all chains.
    pub fn devnet() -> Self {
        let chains = vec![
            ChainParams::derived(DEVNET_HOME_CHAIN, "ETH"),
            ChainParams::derived(DEVNET_REMOTE_CHAIN, "BSC"),
            ChainParams::derived(DEVNET_OTHER_CHAIN, "POL"),
        ];

        let faucet_balance = Amount::from_units(DEVNET_FAUCET_SUPPLY, DEVNET_TOKEN_DECIMALS)
            .unwrap_or(Amount::MAX);
        let max = Amount::from_units(DEVNET_MAX_TRANSFER, DEVNET_TOKEN_DECIMALS)
            .unwrap_or(Amount::MAX);

        let tokens = vec![TokenParams {
            chain_id: DEVNET_HOME_CHAIN,
            address: DEVNET_TOKEN,
            name: "Dev Token".to_string(),
            symbol: "DEV".to_string(),
            decimals: DEVNET_TOKEN_DECIMALS,
            minter: None,
            balances: vec![BalanceParams {
                holder: DEVNET_FAUCET,
                amount: faucet_balance,
            }],
        }];

        let policies = chains
            .iter()
            .map(|chain| PolicyParams {
                chain_id: chain.chain_id,
                token: DEVNET_TOKEN,
                min: Amount::new(1),
                max,
                fee_bps: DEFAULT_FEE_BPS,
                enabled: true,
            })
            .collect();

        Self {
            chains,
            tokens,
            policies,
            adapters: Vec::new(),
        }
    }
}
