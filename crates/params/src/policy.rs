//! Transfer policies.

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    constants::MAX_FEE_BPS,
    types::ChainId,
};

use crate::errors::{ParamsError, ParamsResult};

/// The whitelist entry installed for `token` on `chain_id` at boot.
///
/// On the token's home chain the policy governs Portal deposits; on every other chain it is keyed
/// by the same origin token address and governs Synthesis transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    /// The chain whose whitelist receives the entry.
    pub chain_id: ChainId,

    /// The origin token.
    pub token: Address,

    /// Smallest accepted amount.
    #[serde(default)]
    pub min: Amount,

    /// Largest accepted amount.
    pub max: Amount,

    /// Fee rate in basis points.
    #[serde(default)]
    pub fee_bps: u64,

    /// Whether transfers are currently allowed.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl PolicyParams {
    pub(crate) fn validate(&self) -> ParamsResult<()> {
        if self.min > self.max {
            return Err(ParamsError::InvalidPolicy {
                chain_id: self.chain_id,
                token: self.token,
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }

        if self.fee_bps > MAX_FEE_BPS {
            return Err(ParamsError::InvalidPolicy {
                chain_id: self.chain_id,
                token: self.token,
                reason: format!("fee {} bps exceeds {MAX_FEE_BPS}", self.fee_bps),
            });
        }

        Ok(())
    }
}
