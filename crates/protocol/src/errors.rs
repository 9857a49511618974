//! Errors raised by the bridge contracts.
//!
//! Every error aborts the transaction that raised it, so no variant ever describes a partially
//! applied change.

use std::fmt;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address, amount::Amount, errors::CodecError, instruction::BridgeAction,
    types::ChainId,
};
use thiserror::Error;

use crate::access::Role;

/// Why an amount was refused by a token policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyViolation {
    /// The token has no policy at all.
    NotWhitelisted,
    /// The policy exists but transfers are disabled.
    Disabled,
    /// The amount is below the policy minimum.
    BelowMin {
        /// The policy minimum.
        min: Amount,
    },
    /// The amount is above the policy maximum.
    AboveMax {
        /// The policy maximum.
        max: Amount,
    },
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyViolation::NotWhitelisted => write!(f, "token is not whitelisted"),
            PolicyViolation::Disabled => write!(f, "transfers are disabled"),
            PolicyViolation::BelowMin { min } => write!(f, "below minimum {min}"),
            PolicyViolation::AboveMax { max } => write!(f, "above maximum {max}"),
        }
    }
}

/// The taxonomy tag of a [`BridgeError`], without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ErrorKind {
    PolicyViolation,
    Unauthorized,
    CapExceeded,
    CapBelowSupply,
    InsufficientBalance,
    RouteNotRegistered,
    InsufficientCustody,
    InsufficientLockedBalance,
    UnknownToken,
    UnknownSynth,
    Adapter,
    AdapterPaused,
    InvalidPolicy,
    WrongDestination,
    UnexpectedAction,
    Codec,
    Overflow,
    LocalRedemptionUnavailable,
}

/// Errors raised by the bridge contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The amount is outside the token's policy or the token is not enabled.
    #[error("policy violation for {amount} of {token}: {violation}")]
    PolicyViolation {
        /// The token whose policy was applied.
        token: Address,
        /// The offending amount.
        amount: Amount,
        /// What was violated.
        violation: PolicyViolation,
    },

    /// The caller does not hold the role required by the operation.
    #[error("{caller} is not authorized as {role}")]
    Unauthorized {
        /// Who called.
        caller: Address,
        /// The required role.
        role: Role,
    },

    /// A mint would take a token's supply above its cap.
    #[error("minting {amount} of {token} exceeds cap {cap} (supply {supply})")]
    CapExceeded {
        /// The capped token.
        token: Address,
        /// Supply before the mint.
        supply: Amount,
        /// The amount that was to be minted.
        amount: Amount,
        /// The cap.
        cap: Amount,
    },

    /// A cap cannot be set below the current supply.
    #[error("cap {cap} of {token} is below supply {supply}")]
    CapBelowSupply {
        /// The capped token.
        token: Address,
        /// The requested cap.
        cap: Amount,
        /// The current supply.
        supply: Amount,
    },

    /// A holder does not have enough of a token.
    #[error("{holder} holds {balance} of {token}, needs {amount}")]
    InsufficientBalance {
        /// The token.
        token: Address,
        /// The holder.
        holder: Address,
        /// Their balance.
        balance: Amount,
        /// The amount needed.
        amount: Amount,
    },

    /// No route is registered for a chain, or a contract is not the registered one.
    #[error("{contract} is not a registered bridge contract of chain {chain_id}")]
    RouteNotRegistered {
        /// The chain.
        chain_id: ChainId,
        /// The contract that is not registered, zero if the chain has no route at all.
        contract: Address,
    },

    /// The Portal can neither unlock nor mint a wrapped representation.
    #[error("portal custody of {token} is {custody}, cannot release {amount}")]
    InsufficientCustody {
        /// The origin token.
        token: Address,
        /// Accounted custody.
        custody: Amount,
        /// The amount to release.
        amount: Amount,
    },

    /// Fewer tokens were transferred into the Portal than the call claims.
    #[error("only {locked} of {token} is locked in the portal, needs {amount}")]
    InsufficientLockedBalance {
        /// The origin token.
        token: Address,
        /// Unaccounted balance held by the Portal.
        locked: Amount,
        /// The amount the call claims.
        amount: Amount,
    },

    /// The token does not exist on this chain.
    #[error("unknown token {0}")]
    UnknownToken(Address),

    /// The synthetic token does not exist on this chain.
    #[error("unknown synthetic token {0}")]
    UnknownSynth(Address),

    /// An adapter refused the operation.
    #[error("{adapter}: {reason}")]
    Adapter {
        /// The adapter's name.
        adapter: String,
        /// What went wrong.
        reason: String,
    },

    /// The adapter is paused.
    #[error("{adapter}: paused")]
    AdapterPaused {
        /// The adapter's name.
        adapter: String,
    },

    /// A policy violates `min <= max` or `fee_bps <= 10000`.
    #[error("invalid policy for {token}: {reason}")]
    InvalidPolicy {
        /// The token.
        token: Address,
        /// What is wrong with it.
        reason: String,
    },

    /// A request was delivered to the wrong chain.
    #[error("request for chain {got} delivered to chain {expected}")]
    WrongDestination {
        /// The local chain.
        expected: ChainId,
        /// The chain named in the request.
        got: ChainId,
    },

    /// A contract received an instruction it does not settle.
    #[error("{contract} cannot settle {action} instructions")]
    UnexpectedAction {
        /// The receiving contract.
        contract: Address,
        /// The action.
        action: BridgeAction,
    },

    /// The payload could not be encoded or decoded.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Local redemption requires the synthetic's origin to be this chain.
    #[error("{synth} originates on chain {origin_chain_id}, cannot redeem locally")]
    LocalRedemptionUnavailable {
        /// The synthetic token.
        synth: Address,
        /// Its origin chain.
        origin_chain_id: ChainId,
    },
}

impl BridgeError {
    /// Returns the taxonomy tag.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            BridgeError::Unauthorized { .. } => ErrorKind::Unauthorized,
            BridgeError::CapExceeded { .. } => ErrorKind::CapExceeded,
            BridgeError::CapBelowSupply { .. } => ErrorKind::CapBelowSupply,
            BridgeError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            BridgeError::RouteNotRegistered { .. } => ErrorKind::RouteNotRegistered,
            BridgeError::InsufficientCustody { .. } => ErrorKind::InsufficientCustody,
            BridgeError::InsufficientLockedBalance { .. } => ErrorKind::InsufficientLockedBalance,
            BridgeError::UnknownToken(_) => ErrorKind::UnknownToken,
            BridgeError::UnknownSynth(_) => ErrorKind::UnknownSynth,
            BridgeError::Adapter { .. } => ErrorKind::Adapter,
            BridgeError::AdapterPaused { .. } => ErrorKind::AdapterPaused,
            BridgeError::InvalidPolicy { .. } => ErrorKind::InvalidPolicy,
            BridgeError::WrongDestination { .. } => ErrorKind::WrongDestination,
            BridgeError::UnexpectedAction { .. } => ErrorKind::UnexpectedAction,
            BridgeError::Codec(_) => ErrorKind::Codec,
            BridgeError::Overflow(_) => ErrorKind::Overflow,
            BridgeError::LocalRedemptionUnavailable { .. } => {
                ErrorKind::LocalRedemptionUnavailable
            }
        }
    }

    pub(crate) fn adapter(adapter: &str, reason: impl Into<String>) -> Self {
        BridgeError::Adapter {
            adapter: adapter.to_owned(),
            reason: reason.into(),
        }
    }
}

/// The result type for bridge contract operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
