//! Adapter bindings installed at boot.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{address::Address, amount::Amount, types::ChainId};

/// Which kind of external representation an adapter manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// A liquidity-pool share token created for the adapter.
    Pool,
    /// An existing third-party token the adapter is allowed to mint.
    ThirdParty,
}

/// Binds the synthetic representation of `origin_token` on `chain_id` to an external token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterParams {
    /// The chain hosting the synthetic token and the adapter.
    pub chain_id: ChainId,

    /// The adapter's kind.
    pub kind: AdapterKind,

    /// The adapter's address. It owns the external token's mint authority.
    pub address: Address,

    /// The origin token whose synthetic representation is adapted.
    pub origin_token: Address,

    /// The origin token's home chain.
    pub origin_chain_id: ChainId,

    /// The external token (pool share or third-party token).
    pub external_token: Address,

    /// Decimals of the external token.
    pub external_decimals: u8,

    /// Maximum external supply the adapter may mint.
    pub cap: Amount,
}
