//! Errors of the messaging layer.

use synth_bridge_db::errors::DbError;
use synth_bridge_params::errors::ParamsError;
use synth_bridge_primitives::types::{ChainId, RequestId};
use synth_bridge_protocol::errors::BridgeError;
use thiserror::Error;

/// Errors raised while booting a network or relaying between its chains.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The deployment parameters are inconsistent.
    #[error("invalid params: {0}")]
    Params(#[from] ParamsError),

    /// The request ledger failed.
    #[error("request ledger: {0}")]
    Db(#[from] DbError),

    /// No chain with this id is part of the network.
    #[error("unknown chain {0}")]
    UnknownChain(ChainId),

    /// The endpoint assigned an id that the request ledger already holds.
    #[error("request {0} is already recorded")]
    DuplicateRequest(RequestId),

    /// The request ledger has no request with this id.
    #[error("unknown request {0}")]
    UnknownRequest(RequestId),

    /// A chain rejected a transaction.
    #[error("chain {chain_id}: {source}")]
    Bridge {
        /// The chain that rejected it.
        chain_id: ChainId,
        /// Why.
        source: BridgeError,
    },
}

impl RelayError {
    /// The bridge error behind this error, if a chain rejected something.
    pub const fn bridge_error(&self) -> Option<&BridgeError> {
        match self {
            RelayError::Bridge { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result of a messaging layer operation.
pub type RelayResult<T> = Result<T, RelayError>;
