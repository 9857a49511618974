//! Default values used by the development deployment.

use synth_bridge_primitives::{address::Address, types::ChainId};

/// Chain id of the development "home" chain.
pub const DEVNET_HOME_CHAIN: ChainId = ChainId::new(1);

/// Chain id of the development "remote" chain.
pub const DEVNET_REMOTE_CHAIN: ChainId = ChainId::new(56);

/// Chain id of the second development "remote" chain.
pub const DEVNET_OTHER_CHAIN: ChainId = ChainId::new(137);

/// Default fee charged on every transfer, in basis points.
pub const DEFAULT_FEE_BPS: u64 = 10;

/// Address of the development origin token on the home chain.
pub const DEVNET_TOKEN: Address = Address::repeat_byte(0x70);

/// Address of the account funded with the development origin token.
pub const DEVNET_FAUCET: Address = Address::repeat_byte(0xfa);

/// Decimals of the development origin token.
pub const DEVNET_TOKEN_DECIMALS: u8 = 18;

/// Whole tokens initially held by the faucet.
pub const DEVNET_FAUCET_SUPPLY: u128 = 1_000_000;

/// Largest single transfer allowed by the development policy, in whole tokens.
pub const DEVNET_MAX_TRANSFER: u128 = 100_000;
