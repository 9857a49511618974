//! In-memory implementation of the request ledger.

mod ledger;

pub use ledger::InMemoryRequestLedger;
