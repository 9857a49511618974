//! Errors of the request ledger.

use synth_bridge_primitives::types::RequestId;
use thiserror::Error;

use crate::persistent::errors::StorageError;

/// Errors that can occur when reading or writing the request ledger.
#[derive(Debug, Error)]
pub enum DbError {
    /// The SQLite backend failed.
    #[error("sqlite: {0}")]
    Storage(#[from] StorageError),

    /// No request with this id was recorded.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// The request was already settled and its state is final.
    #[error("request {0} is already settled")]
    AlreadySettled(RequestId),
}

/// Result of a request ledger operation.
pub type DbResult<T> = Result<T, DbError>;
