//! Decimal rescaling between a synthetic token and an adapter's external token.

use synth_bridge_primitives::amount::Amount;

use crate::errors::{BridgeError, BridgeResult};

/// Converts amounts between `synth_decimals` and `adapter_decimals`.
///
/// Conversions towards the recipient round down and conversions that debit the holder round up,
/// so a round trip never yields more than it started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalScale {
    synth_decimals: u8,
    adapter_decimals: u8,
    factor: Amount,
}

impl DecimalScale {
    /// Creates a scale. Fails if `10^|adapter - synth|` does not fit in 256 bits.
    pub fn new(synth_decimals: u8, adapter_decimals: u8) -> BridgeResult<Self> {
        let exp = synth_decimals.abs_diff(adapter_decimals);
        let factor = Amount::pow10(exp.into()).ok_or(BridgeError::Overflow("decimal scale"))?;

        Ok(Self {
            synth_decimals,
            adapter_decimals,
            factor,
        })
    }

    /// Decimals of the synthetic token.
    pub const fn synth_decimals(&self) -> u8 {
        self.synth_decimals
    }

    /// Decimals of the external token.
    pub const fn adapter_decimals(&self) -> u8 {
        self.adapter_decimals
    }

    const fn scales_up(&self) -> bool {
        self.adapter_decimals >= self.synth_decimals
    }

    /// `amount * 10^(adapter - synth)`, rounded down.
    pub fn to_adapter_floor(&self, amount: Amount) -> BridgeResult<Amount> {
        if self.scales_up() {
            self.up(amount)
        } else {
            self.down_floor(amount)
        }
    }

    /// `amount * 10^(adapter - synth)`, rounded up.
    pub fn to_adapter_ceil(&self, amount: Amount) -> BridgeResult<Amount> {
        if self.scales_up() {
            self.up(amount)
        } else {
            self.down_ceil(amount)
        }
    }

    /// `adapted * 10^(synth - adapter)`, rounded down.
    pub fn to_synth_floor(&self, adapted: Amount) -> BridgeResult<Amount> {
        if self.scales_up() {
            self.down_floor(adapted)
        } else {
            self.up(adapted)
        }
    }

    fn up(&self, amount: Amount) -> BridgeResult<Amount> {
        amount
            .checked_mul(self.factor)
            .ok_or(BridgeError::Overflow("decimal scale"))
    }

    fn down_floor(&self, amount: Amount) -> BridgeResult<Amount> {
        amount
            .mul_div_floor(Amount::new(1), self.factor)
            .ok_or(BridgeError::Overflow("decimal scale"))
    }

    fn down_ceil(&self, amount: Amount) -> BridgeResult<Amount> {
        amount
            .mul_div_ceil(Amount::new(1), self.factor)
            .ok_or(BridgeError::Overflow("decimal scale"))
    }
}
