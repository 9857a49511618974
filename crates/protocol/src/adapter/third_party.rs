//! Adapter issuing an existing third-party token.

use synth_bridge_primitives::amount::Amount;

use super::{Adapter, AdapterCore, AdapterSpec};
use crate::{
    errors::{BridgeError, BridgeResult},
    ledger::TokenLedger,
    synth_token::SyntheticToken,
};

const NAME: &str = "ThirdPartyAdapter";

/// Issues a third-party token against synthetic backing.
///
/// The token may have supply that never went through the bridge, so only what this adapter
/// issued has to be covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyAdapter {
    core: AdapterCore,
}

impl ThirdPartyAdapter {
    pub(super) fn attach(
        ledger: &TokenLedger,
        synth: &SyntheticToken,
        spec: &AdapterSpec,
    ) -> BridgeResult<Self> {
        let token = ledger.token(spec.external_token)?;
        if token.minter() != Some(spec.address) {
            return Err(BridgeError::adapter(NAME, "adapter is not the token's minter"));
        }

        let core = AdapterCore::new(
            synth,
            spec.address,
            spec.external_token,
            token.metadata().decimals,
            spec.cap,
        )?;

        Ok(Self { core })
    }
}

impl Adapter for ThirdPartyAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn core(&self) -> &AdapterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AdapterCore {
        &mut self.core
    }

    fn external_supply(&self, _ledger: &TokenLedger) -> Amount {
        self.core.issued()
    }
}
