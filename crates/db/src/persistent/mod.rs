//! SQLite implementation of the request ledger.

pub mod constants;
pub mod errors;
pub mod sqlite;
mod types;
