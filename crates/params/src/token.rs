//! Origin tokens that exist on a chain before the bridge starts.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    types::{ChainId, TokenMetadata},
};

/// A fungible token native to `chain_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    /// The chain the token lives on.
    pub chain_id: ChainId,

    /// The token's address.
    pub address: Address,

    /// Human readable name.
    pub name: String,

    /// Ticker symbol.
    pub symbol: String,

    /// Decimals of the base unit.
    pub decimals: u8,

    /// Account allowed to mint and burn the token, if any.
    #[serde(default)]
    pub minter: Option<Address>,

    /// Initial balances.
    #[serde(default)]
    pub balances: Vec<BalanceParams>,
}

impl TokenParams {
    /// The token's metadata.
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata::new(&self.name, &self.symbol, self.decimals)
    }
}

/// An initial balance of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceParams {
    /// The holder.
    pub holder: Address,

    /// The amount in base units.
    pub amount: Amount,
}
