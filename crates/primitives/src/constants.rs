//! Constants shared by every deployment of the bridge.
//!
//! Changing any of these changes either the fee arithmetic or the wire format, so both ends of
//! the bridge must agree on them.

/// Denominator for fee rates expressed in basis points.
pub const FEE_DENOMINATOR: u64 = 10_000;

/// The largest fee rate a token policy may carry (100%).
pub const MAX_FEE_BPS: u64 = FEE_DENOMINATOR;

/// Length of an [`Address`](crate::address::Address) in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Length of a [`RequestId`](crate::types::RequestId) in bytes.
pub const REQUEST_ID_LEN: usize = 32;

/// Version byte prefixed to every encoded
/// [`BridgeInstruction`](crate::instruction::BridgeInstruction).
pub const INSTRUCTION_VERSION: u8 = 1;

/// Domain separator used when deriving synthetic token addresses.
pub const SYNTH_ADDRESS_DOMAIN: &[u8] = b"synth";

/// Domain separator used when deriving request ids.
pub const REQUEST_ID_DOMAIN: &[u8] = b"bridge-request";
