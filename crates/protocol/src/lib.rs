//! The bridging accounting protocol.
//!
//! Every chain taking part in the bridge runs the same set of contracts: a [`Whitelist`] of
//! per-token policies, an [`AddressBook`] of trusted peers, a [`SynthRegistry`] of synthetic
//! tokens, the [`Portal`] that custodies origin tokens and the [`Synthesis`] that mints and burns
//! their synthetic representations (optionally through an adapter). A [`Chain`] bundles them into a
//! single serialized state that is only ever mutated through all-or-nothing transactions.
//!
//! Contracts never talk to each other across chains directly. A successful transaction returns a
//! [`TxOutput`] whose duties (outbound requests and treasury credits) are executed by the caller
//! after commit, and inbound requests are handed back to [`Chain::on_receive`] by whatever
//! messaging layer sits in between.
//!
//! [`Whitelist`]: whitelist::Whitelist
//! [`AddressBook`]: address_book::AddressBook
//! [`SynthRegistry`]: registry::SynthRegistry
//! [`Portal`]: portal::Portal
//! [`Synthesis`]: synthesis::Synthesis
//! [`Chain`]: chain::Chain
//! [`Chain::on_receive`]: chain::Chain::on_receive
//! [`TxOutput`]: output::TxOutput

pub mod access;
pub mod adapter;
pub mod address_book;
pub mod chain;
pub mod errors;
pub mod ledger;
pub mod messaging;
pub mod output;
pub mod portal;
pub mod registry;
pub mod synth_token;
pub mod synthesis;
pub mod treasury;
pub mod whitelist;

#[cfg(test)]
pub(crate) mod testing;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        access::{AccessControl, Role},
        adapter::{AdapterBinding, AdapterKind, AdapterSpec},
        address_book::{AddressBook, Route},
        chain::{Chain, ChainInfo, ChainState},
        errors::{BridgeError, BridgeResult, ErrorKind, PolicyViolation},
        ledger::{Token, TokenLedger},
        messaging::{InboundMessage, MessagingEndpoint, OutboundRequest},
        output::{BridgeDuty, BridgeEvent, FeeCredit, TxOutput},
        registry::SynthRegistry,
        synth_token::SyntheticToken,
        treasury::{InMemoryTreasury, Treasury},
        whitelist::{Quote, TokenPolicy, Whitelist},
    };
}
