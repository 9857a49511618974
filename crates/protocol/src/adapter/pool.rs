//! Adapter issuing a pool share token created for it.

use synth_bridge_primitives::{address::Address, amount::Amount, types::TokenMetadata};

use super::{Adapter, AdapterCore, AdapterSpec};
use crate::{
    errors::{BridgeError, BridgeResult},
    ledger::{Token, TokenLedger},
    synth_token::SyntheticToken,
};

const NAME: &str = "PoolAdapter";

/// Issues pool shares against synthetic backing.
///
/// The share token only ever comes from this adapter, so its whole supply must stay covered by
/// the backing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAdapter {
    core: AdapterCore,
}

impl PoolAdapter {
    pub(super) fn create(
        ledger: &mut TokenLedger,
        synth: &SyntheticToken,
        spec: &AdapterSpec,
    ) -> BridgeResult<Self> {
        let metadata = TokenMetadata::new(
            format!("{} Pool Share", synth.metadata().name),
            format!("{}-LP", synth.metadata().symbol),
            spec.external_decimals,
        );
        let share = Token::new(spec.external_token, metadata, Some(spec.address));
        if !ledger.insert(share) {
            return Err(BridgeError::adapter(NAME, "share token already exists"));
        }

        let core = AdapterCore::new(
            synth,
            spec.address,
            spec.external_token,
            spec.external_decimals,
            spec.cap,
        )?;

        Ok(Self { core })
    }

    /// The share token.
    pub const fn share_token(&self) -> Address {
        self.core.external_token()
    }
}

impl Adapter for PoolAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AdapterCore {
        &mut self.core
    }

    fn external_supply(&self, ledger: &TokenLedger) -> Amount {
        ledger.total_supply(self.share_token())
    }
}
