//! This crate contains general types, constants and pure functions that need to be shared across
//! multiple crates of the synthetic-token bridge.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace. Everything that crosses a chain boundary (addresses, chain ids,
//! amounts and the encoded bridge instruction) is defined here so that both ends of the bridge
//! agree on the exact representation.

pub mod address;
pub mod amount;
pub mod constants;
pub mod errors;
pub mod instruction;
pub mod types;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        address::Address,
        amount::Amount,
        constants::*,
        errors::{CodecError, CodecResult, ParseError},
        instruction::{BridgeAction, BridgeInstruction},
        types::{ChainId, RequestId, SynthCategory, SynthMetadata, TokenMetadata},
    };
}
