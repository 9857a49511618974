//! The registry of synthetic tokens on a chain.

use std::collections::BTreeMap;

use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    constants::SYNTH_ADDRESS_DOMAIN,
    types::{ChainId, SynthMetadata},
};
use tracing::debug;

use crate::{
    errors::{BridgeError, BridgeResult},
    synth_token::SyntheticToken,
};

/// Maps `(origin token, origin chain)` to the synthetic token representing it on this chain.
///
/// Addresses are derived from the key, so every chain computes the same address for the same
/// origin token and repeated creation always resolves to the first instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthRegistry {
    synthesis: Address,
    default_cap: Amount,
    entries: BTreeMap<(Address, ChainId), Address>,
    synths: BTreeMap<Address, SyntheticToken>,
}

/// The result of [`SynthRegistry::get_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// The synthetic token.
    pub synth: Address,
    /// Whether this call created it.
    pub created: bool,
}

impl SynthRegistry {
    /// Creates an empty registry whose tokens are owned by `synthesis` and start with
    /// `default_cap`.
    pub const fn new(synthesis: Address, default_cap: Amount) -> Self {
        Self {
            synthesis,
            default_cap,
            entries: BTreeMap::new(),
            synths: BTreeMap::new(),
        }
    }

    /// The address the synthetic token for the given key has or will have.
    pub fn derive_address(&self, origin_token: Address, origin_chain_id: ChainId) -> Address {
        Address::derive(&[
            SYNTH_ADDRESS_DOMAIN,
            self.synthesis.as_bytes(),
            &origin_chain_id.to_be_bytes(),
            origin_token.as_bytes(),
        ])
    }

    /// Returns the synthetic token for the key, creating it from `metadata` on first use.
    ///
    /// Metadata passed after creation is ignored.
    pub fn get_or_create(
        &mut self,
        origin_token: Address,
        origin_chain_id: ChainId,
        metadata: &SynthMetadata,
    ) -> Resolved {
        if let Some(synth) = self.entries.get(&(origin_token, origin_chain_id)) {
            return Resolved {
                synth: *synth,
                created: false,
            };
        }

        let synth = self.derive_address(origin_token, origin_chain_id);
        let token = SyntheticToken::new(
            synth,
            self.synthesis,
            origin_token,
            origin_chain_id,
            metadata.clone(),
            self.default_cap,
        );
        debug!(%synth, %origin_token, %origin_chain_id, symbol = %token.metadata().symbol, "synthetic token created");

        self.entries.insert((origin_token, origin_chain_id), synth);
        self.synths.insert(synth, token);

        Resolved {
            synth,
            created: true,
        }
    }

    /// The synthetic token for the key, or [`Address::ZERO`] if there is none.
    pub fn lookup(&self, origin_token: Address, origin_chain_id: ChainId) -> Address {
        self.entries
            .get(&(origin_token, origin_chain_id))
            .copied()
            .unwrap_or(Address::ZERO)
    }

    /// Returns `true` if `synth` is a registered synthetic token.
    pub fn contains(&self, synth: Address) -> bool {
        self.synths.contains_key(&synth)
    }

    /// Looks up a synthetic token by address.
    pub fn synth(&self, synth: Address) -> BridgeResult<&SyntheticToken> {
        self.synths.get(&synth).ok_or(BridgeError::UnknownSynth(synth))
    }

    pub(crate) fn synth_mut(&mut self, synth: Address) -> BridgeResult<&mut SyntheticToken> {
        self.synths
            .get_mut(&synth)
            .ok_or(BridgeError::UnknownSynth(synth))
    }

    /// Iterates over all synthetic tokens.
    pub fn synths(&self) -> impl Iterator<Item = &SyntheticToken> + '_ {
        self.synths.values()
    }
}
