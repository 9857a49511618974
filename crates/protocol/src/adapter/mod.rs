//! Adapters that represent a synthetic token as a different external token.
//!
//! An adapter holds synthetic tokens as backing and issues an external token (a pool share or a
//! third-party token) against them, rescaling between the two decimal counts. The Synthesis
//! delegates mint and burn to the adapter bound to a synthetic token and falls back to direct
//! mint and burn when none is bound.

mod pool;
mod scaling;
mod third_party;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{address::Address, amount::Amount};
use tracing::debug;

pub use self::{pool::PoolAdapter, scaling::DecimalScale, third_party::ThirdPartyAdapter};
use crate::{
    errors::{BridgeError, BridgeResult},
    ledger::TokenLedger,
    synth_token::SyntheticToken,
};

/// Which kind of adapter to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Issues a pool share token created for the adapter.
    Pool,
    /// Issues an existing third-party token.
    ThirdParty,
}

/// What an admin provides to bind an adapter to a synthetic token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterSpec {
    /// The adapter kind.
    pub kind: AdapterKind,
    /// The adapter's own address, which holds the backing and mints the external token.
    pub address: Address,
    /// The external token. A pool adapter creates it; a third-party adapter requires it to exist.
    pub external_token: Address,
    /// Decimals of a newly created pool share. Third-party tokens keep their own.
    pub external_decimals: u8,
    /// Cap on the external supply issued by the adapter.
    pub cap: Amount,
}

/// State shared by all adapter kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterCore {
    address: Address,
    synth: Address,
    external_token: Address,
    scale: DecimalScale,
    cap: Amount,
    paused: bool,
    issued: Amount,
}

impl AdapterCore {
    pub(crate) fn new(
        synth: &SyntheticToken,
        address: Address,
        external_token: Address,
        external_decimals: u8,
        cap: Amount,
    ) -> BridgeResult<Self> {
        Ok(Self {
            address,
            synth: synth.address(),
            external_token,
            scale: DecimalScale::new(synth.decimals(), external_decimals)?,
            cap,
            paused: false,
            issued: Amount::ZERO,
        })
    }

    /// The adapter's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The synthetic token backing the adapter.
    pub const fn synth(&self) -> Address {
        self.synth
    }

    /// The external token.
    pub const fn external_token(&self) -> Address {
        self.external_token
    }

    /// The decimal conversion.
    pub const fn scale(&self) -> &DecimalScale {
        &self.scale
    }

    /// Cap on the external supply issued by the adapter.
    pub const fn cap(&self) -> Amount {
        self.cap
    }

    /// Whether mint and burn are suspended.
    pub const fn paused(&self) -> bool {
        self.paused
    }

    /// External tokens issued and not yet burned through the adapter.
    pub const fn issued(&self) -> Amount {
        self.issued
    }
}

/// Mint and burn through an adapter.
///
/// `mint` is called after the backing synthetic tokens have been minted to the adapter; `burn`
/// is called before the backing is released. Both return the external amount that moved.
pub trait Adapter {
    /// Used as the prefix of adapter errors.
    fn name(&self) -> &'static str;

    /// Shared state.
    fn core(&self) -> &AdapterCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut AdapterCore;

    /// The external supply that must stay covered by the backing.
    fn external_supply(&self, ledger: &TokenLedger) -> Amount;

    /// Issues the external equivalent of `amount` synthetic tokens to `to`, rounding down.
    fn mint(
        &mut self,
        ledger: &mut TokenLedger,
        backing: Amount,
        to: Address,
        amount: Amount,
    ) -> BridgeResult<Amount> {
        let name = self.name();
        let core = self.core();
        if core.paused {
            return Err(BridgeError::AdapterPaused {
                adapter: name.to_owned(),
            });
        }

        let external = core.scale.to_adapter_floor(amount)?;
        let issued = match core.issued.checked_add(external) {
            Some(issued) if issued <= core.cap => issued,
            _ => {
                return Err(BridgeError::CapExceeded {
                    token: core.external_token,
                    supply: core.issued,
                    amount: external,
                    cap: core.cap,
                })
            }
        };

        let (address, token) = (core.address, core.external_token);
        ledger.mint(address, token, to, external)?;
        self.core_mut().issued = issued;

        let covered = self.core().scale.to_adapter_floor(backing)?;
        if self.external_supply(ledger) > covered {
            return Err(BridgeError::adapter(name, "wrong amount"));
        }

        debug!(adapter = name, %to, %amount, %external, "adapter minted");
        Ok(external)
    }

    /// Takes the external equivalent of `amount` synthetic tokens from `from`, rounding up.
    fn burn(&mut self, ledger: &mut TokenLedger, from: Address, amount: Amount) -> BridgeResult<Amount> {
        let name = self.name();
        let core = self.core();
        if core.paused {
            return Err(BridgeError::AdapterPaused {
                adapter: name.to_owned(),
            });
        }

        let external = core.scale.to_adapter_ceil(amount)?;
        let (address, token) = (core.address, core.external_token);
        ledger.burn(address, token, from, external)?;

        let core = self.core_mut();
        core.issued = core.issued.saturating_sub(external);

        debug!(adapter = name, %from, %amount, %external, "adapter burned");
        Ok(external)
    }
}

/// An adapter bound to a synthetic token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterBinding {
    /// A pool share adapter.
    Pool(PoolAdapter),
    /// A third-party token adapter.
    ThirdParty(ThirdPartyAdapter),
}

impl AdapterBinding {
    /// Creates the adapter described by `spec` for `synth`, registering a pool share in `ledger`
    /// when needed.
    pub(crate) fn bind(
        ledger: &mut TokenLedger,
        synth: &SyntheticToken,
        spec: &AdapterSpec,
    ) -> BridgeResult<Self> {
        match spec.kind {
            AdapterKind::Pool => PoolAdapter::create(ledger, synth, spec).map(Self::Pool),
            AdapterKind::ThirdParty => {
                ThirdPartyAdapter::attach(ledger, synth, spec).map(Self::ThirdParty)
            }
        }
    }

    /// The adapter kind.
    pub const fn kind(&self) -> AdapterKind {
        match self {
            AdapterBinding::Pool(_) => AdapterKind::Pool,
            AdapterBinding::ThirdParty(_) => AdapterKind::ThirdParty,
        }
    }

    pub(crate) fn set_cap(&mut self, cap: Amount) -> BridgeResult<Amount> {
        let core = self.core_mut();
        if cap < core.issued {
            return Err(BridgeError::CapBelowSupply {
                token: core.external_token,
                cap,
                supply: core.issued,
            });
        }

        Ok(std::mem::replace(&mut core.cap, cap))
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.core_mut().paused = paused;
    }
}

impl Adapter for AdapterBinding {
    fn name(&self) -> &'static str {
        match self {
            AdapterBinding::Pool(adapter) => adapter.name(),
            AdapterBinding::ThirdParty(adapter) => adapter.name(),
        }
    }

    fn core(&self) -> &AdapterCore {
        match self {
            AdapterBinding::Pool(adapter) => adapter.core(),
            AdapterBinding::ThirdParty(adapter) => adapter.core(),
        }
    }

    fn core_mut(&mut self) -> &mut AdapterCore {
        match self {
            AdapterBinding::Pool(adapter) => adapter.core_mut(),
            AdapterBinding::ThirdParty(adapter) => adapter.core_mut(),
        }
    }

    fn external_supply(&self, ledger: &TokenLedger) -> Amount {
        match self {
            AdapterBinding::Pool(adapter) => adapter.external_supply(ledger),
            AdapterBinding::ThirdParty(adapter) => adapter.external_supply(ledger),
        }
    }
}
