//! Identifiers and token descriptors shared across the bridge.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{constants::REQUEST_ID_LEN, errors::ParseError};

/// Numeric identifier of a chain.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Creates a new chain id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the big-endian encoding, used when hashing.
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a cross-chain request, assigned by the messaging endpoint.
///
/// This is the idempotency key of the replay guard: a request id is settled at most once.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId([u8; REQUEST_ID_LEN]);

impl RequestId {
    /// Creates a request id from raw bytes.
    pub const fn new(bytes: [u8; REQUEST_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; REQUEST_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// Short form keeps logs readable.
impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId(0x{}..)", hex::encode(&self.0[..6]))
    }
}

impl FromStr for RequestId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; REQUEST_ID_LEN] =
            bytes
                .try_into()
                .map_err(|bytes: Vec<u8>| ParseError::InvalidLength {
                    expected: REQUEST_ID_LEN,
                    got: bytes.len(),
                })?;

        Ok(Self(bytes))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How a synthetic token came to be and who controls its external representation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SynthCategory {
    /// Created by the bridge on first delivery.
    #[default]
    Default,
    /// Created by an administrator with custom parameters.
    Custom,
    /// Represented by a third-party token through an adapter.
    ThirdParty,
    /// A third-party token that is itself the original on its home chain.
    ThirdPartyOriginal,
}

impl fmt::Display for SynthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SynthCategory::Default => "default",
            SynthCategory::Custom => "custom",
            SynthCategory::ThirdParty => "third-party",
            SynthCategory::ThirdPartyOriginal => "third-party-original",
        };
        write!(f, "{s}")
    }
}

/// Descriptive metadata of a fungible token.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct TokenMetadata {
    /// Human readable name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of decimals of the base unit.
    pub decimals: u8,
}

impl TokenMetadata {
    /// Creates new token metadata.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Everything a destination chain needs to create the synthetic representation of an origin
/// token on first delivery.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SynthMetadata {
    /// Metadata of the origin token (the synthetic mirrors its decimals).
    pub token: TokenMetadata,
    /// Symbol of the origin token's home chain.
    pub origin_chain_symbol: String,
    /// Category of the synthetic representation.
    pub category: SynthCategory,
}

impl SynthMetadata {
    /// The synthetic token's name, e.g. `"Synthetic USD Coin (ETH)"`.
    pub fn synth_name(&self) -> String {
        format!("Synthetic {} ({})", self.token.name, self.origin_chain_symbol)
    }

    /// The synthetic token's symbol, e.g. `"sUSDC(ETH)"`.
    pub fn synth_symbol(&self) -> String {
        format!("s{}({})", self.token.symbol, self.origin_chain_symbol)
    }
}
