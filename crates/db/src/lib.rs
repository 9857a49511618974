//! Persistence for the messaging layer.
//!
//! The request ledger is the replay guard of the bridge: every request handed to the messaging
//! endpoint is recorded here with its delivery state, and a request that has been settled once is
//! never handed to a chain again.

pub mod errors;
pub mod inmemory;
pub mod ledger;
pub mod persistent;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        errors::{DbError, DbResult},
        inmemory::InMemoryRequestLedger,
        ledger::{RequestEnvelope, RequestLedgerDb, RequestRecord, RequestState},
        persistent::sqlite::SqliteRequestLedger,
    };
}
