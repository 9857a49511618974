//! Errors for the deployment parameters.

use synth_bridge_primitives::{address::Address, types::ChainId};
use thiserror::Error;

/// Error while validating deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The same chain id is configured twice.
    #[error("chain {0} is configured more than once")]
    DuplicateChain(ChainId),

    /// A section references a chain that is not configured.
    #[error("{context} references unknown chain {chain_id}")]
    UnknownChain {
        /// The unknown chain.
        chain_id: ChainId,
        /// Which section contained the reference.
        context: String,
    },

    /// The same token is configured twice on a chain.
    #[error("token {token} is configured more than once on chain {chain_id}")]
    DuplicateToken {
        /// The chain.
        chain_id: ChainId,
        /// The duplicated token.
        token: Address,
    },

    /// A section references a token that is not configured on that chain.
    #[error("{context} references unknown token {token} on chain {chain_id}")]
    UnknownToken {
        /// The chain.
        chain_id: ChainId,
        /// The unknown token.
        token: Address,
        /// Which section contained the reference.
        context: String,
    },

    /// A policy violates `min <= max` or `fee_bps <= 10000`.
    #[error("invalid policy for token {token} on chain {chain_id}: {reason}")]
    InvalidPolicy {
        /// The chain.
        chain_id: ChainId,
        /// The token.
        token: Address,
        /// What is wrong with it.
        reason: String,
    },

    /// A contract address is zero.
    #[error("chain {chain_id} has a zero {role} address")]
    ZeroAddress {
        /// The chain.
        chain_id: ChainId,
        /// Which contract.
        role: &'static str,
    },
}

/// The result type for parameter validation.
pub type ParamsResult<T> = Result<T, ParamsError>;
