//! Token amounts.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use ethnum::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseError;

/// An unsigned 256-bit token amount, always expressed in the token's native decimals.
///
/// All arithmetic is checked: overflow and underflow surface as `None` so callers can turn them
/// into errors instead of silently wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(U256::ZERO);

    /// The largest representable amount.
    pub const MAX: Self = Self(U256::MAX);

    /// Creates an amount from a `u128`.
    pub const fn new(value: u128) -> Self {
        Self(U256::new(value))
    }

    /// Creates an amount from a raw 256-bit integer.
    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// Returns the raw 256-bit integer.
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == U256::ZERO
    }

    /// Returns `10^exp`, or `None` on overflow.
    pub fn pow10(exp: u32) -> Option<Self> {
        let ten = U256::new(10);
        (0..exp)
            .try_fold(U256::ONE, |acc, _| acc.checked_mul(ten))
            .map(Self)
    }

    /// Returns `whole * 10^decimals`, i.e. `whole` tokens expressed in base units.
    pub fn from_units(whole: u128, decimals: u8) -> Option<Self> {
        Self::new(whole).checked_mul(Self::pow10(decimals.into())?)
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked multiplication.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(rhs.0).map(Self)
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Computes `floor(self * numerator / denominator)`.
    ///
    /// Returns `None` on overflow of the intermediate product or if `denominator` is zero.
    pub fn mul_div_floor(self, numerator: Self, denominator: Self) -> Option<Self> {
        let product = self.0.checked_mul(numerator.0)?;
        product.checked_div(denominator.0).map(Self)
    }

    /// Computes `ceil(self * numerator / denominator)`.
    ///
    /// Returns `None` on overflow of the intermediate product or if `denominator` is zero.
    pub fn mul_div_ceil(self, numerator: Self, denominator: Self) -> Option<Self> {
        let product = self.0.checked_mul(numerator.0)?;
        let quotient = product.checked_div(denominator.0)?;
        if product % denominator.0 == U256::ZERO {
            Some(Self(quotient))
        } else {
            quotient.checked_add(U256::ONE).map(Self)
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self::new(value)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace('_', "");
        let parsed = match trimmed.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(&trimmed, 10),
        };

        parsed
            .map(Self)
            .map_err(|e| ParseError::InvalidAmount(format!("{s}: {e}")))
    }
}

impl BorshSerialize for Amount {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        BorshSerialize::serialize(&self.0.to_be_bytes(), writer)
    }
}

impl BorshDeserialize for Amount {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let bytes = <[u8; 32]>::deserialize_reader(reader)?;
        Ok(Self(U256::from_be_bytes(bytes)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts decimal/hex strings as well as plain non-negative integers (TOML and JSON numbers).
struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(Amount::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(format!("negative amount: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}
