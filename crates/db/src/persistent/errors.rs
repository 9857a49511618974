//! Errors of the SQLite request ledger.

use synth_bridge_primitives::types::ChainId;
use thiserror::Error;

/// Errors raised by the SQLite backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The driver failed.
    #[error("sqlite: {0}")]
    Driver(#[from] sqlx::Error),

    /// The schema could not be brought up to date.
    #[error("migration: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A counter column holds a negative or oversized value.
    #[error("counter out of range: {0}")]
    CounterOutOfRange(i64),

    /// The chain id does not fit a signed 64-bit column.
    #[error("chain id {0} cannot be stored")]
    ChainIdOutOfRange(ChainId),

    /// The `state` column holds a tag this version does not know.
    #[error("unknown request state {0}")]
    UnknownState(String),
}
