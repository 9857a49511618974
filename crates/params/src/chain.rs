//! Per-chain contract layout.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{address::Address, types::ChainId};

use crate::errors::{ParamsError, ParamsResult};

/// Where the bridge contracts live on a single chain and who administers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// The chain id.
    pub chain_id: ChainId,

    /// Short symbol of the chain, e.g. `"ETH"`. Embedded in synthetic token names.
    pub symbol: String,

    /// The account allowed to change configuration on this chain.
    pub admin: Address,

    /// The Portal contract.
    pub portal: Address,

    /// The Synthesis contract.
    pub synthesis: Address,

    /// The messaging endpoint that is allowed to deliver inbound requests.
    pub endpoint: Address,

    /// The account that receives collected fees.
    pub treasury: Address,
}

impl ChainParams {
    /// Derives a full set of contract addresses for a chain from its id.
    ///
    /// Only meant for development deployments.
    pub fn derived(chain_id: ChainId, symbol: impl Into<String>) -> Self {
        let id = chain_id.to_be_bytes();
        Self {
            chain_id,
            symbol: symbol.into(),
            admin: Address::derive(&[b"admin", &id]),
            portal: Address::derive(&[b"portal", &id]),
            synthesis: Address::derive(&[b"synthesis", &id]),
            endpoint: Address::derive(&[b"endpoint", &id]),
            treasury: Address::derive(&[b"treasury", &id]),
        }
    }

    pub(crate) fn validate(&self) -> ParamsResult<()> {
        let contracts = [
            ("admin", self.admin),
            ("portal", self.portal),
            ("synthesis", self.synthesis),
            ("endpoint", self.endpoint),
            ("treasury", self.treasury),
        ];

        for (role, address) in contracts {
            if address.is_zero() {
                return Err(ParamsError::ZeroAddress {
                    chain_id: self.chain_id,
                    role,
                });
            }
        }

        Ok(())
    }
}
