//! Capped synthetic tokens.

use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    types::{ChainId, SynthCategory, SynthMetadata, TokenMetadata},
};

use crate::{
    access::{require_account, Role},
    errors::{BridgeError, BridgeResult},
    ledger::Balances,
    output::BridgeEvent,
};

/// The representation of an origin token on a chain other than its home chain.
///
/// Supply only changes through [`Self::mint`] and [`Self::burn`], both reserved to the owner, and
/// never exceeds the cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticToken {
    address: Address,
    metadata: TokenMetadata,
    origin_token: Address,
    origin_chain_id: ChainId,
    origin: SynthMetadata,
    cap: Amount,
    owner: Address,
    balances: Balances,
}

impl SyntheticToken {
    /// Creates an empty synthetic token for `origin_token` on `origin_chain_id`.
    pub fn new(
        address: Address,
        owner: Address,
        origin_token: Address,
        origin_chain_id: ChainId,
        origin: SynthMetadata,
        cap: Amount,
    ) -> Self {
        let metadata = TokenMetadata::new(
            origin.synth_name(),
            origin.synth_symbol(),
            origin.token.decimals,
        );

        Self {
            address,
            metadata,
            origin_token,
            origin_chain_id,
            origin,
            cap,
            owner,
            balances: Balances::new(address),
        }
    }

    /// The token's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Name, symbol and decimals of the synthetic token itself.
    pub const fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// The origin token on its home chain.
    pub const fn origin_token(&self) -> Address {
        self.origin_token
    }

    /// The origin token's home chain.
    pub const fn origin_chain_id(&self) -> ChainId {
        self.origin_chain_id
    }

    /// Metadata of the origin token, forwarded with every outbound request.
    pub const fn origin(&self) -> &SynthMetadata {
        &self.origin
    }

    /// The synth category.
    pub const fn category(&self) -> SynthCategory {
        self.origin.category
    }

    /// Decimals, always equal to the origin token's.
    pub const fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// The current cap.
    pub const fn cap(&self) -> Amount {
        self.cap
    }

    /// The owner, i.e. the mint and burn authority.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// The total supply.
    pub const fn total_supply(&self) -> Amount {
        self.balances.total_supply()
    }

    /// The balance of `holder`.
    pub fn balance_of(&self, holder: Address) -> Amount {
        self.balances.balance_of(holder)
    }

    /// The token's balances.
    pub const fn balances(&self) -> &Balances {
        &self.balances
    }

    /// Mints `amount` to `to`. Owner only, never exceeds the cap.
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> BridgeResult<()> {
        require_account(caller, self.owner, Role::Owner)?;

        let supply = self.total_supply();
        let cap_exceeded = BridgeError::CapExceeded {
            token: self.address,
            supply,
            amount,
            cap: self.cap,
        };
        match supply.checked_add(amount) {
            Some(new_supply) if new_supply <= self.cap => {}
            _ => return Err(cap_exceeded),
        }

        self.balances.mint(to, amount)
    }

    /// Burns `amount` held by `from`. Owner only.
    pub fn burn(&mut self, caller: Address, from: Address, amount: Amount) -> BridgeResult<()> {
        require_account(caller, self.owner, Role::Owner)?;
        self.balances.burn(from, amount)
    }

    /// Changes the cap. Owner only, never below the current supply.
    pub fn set_cap(&mut self, caller: Address, new_cap: Amount) -> BridgeResult<BridgeEvent> {
        require_account(caller, self.owner, Role::Owner)?;

        let supply = self.total_supply();
        if new_cap < supply {
            return Err(BridgeError::CapBelowSupply {
                token: self.address,
                cap: new_cap,
                supply,
            });
        }

        let old_cap = self.cap;
        self.cap = new_cap;

        Ok(BridgeEvent::CapChanged {
            token: self.address,
            old_cap,
            new_cap,
        })
    }

    /// Moves `amount` from `from` to `to`. Open to every holder.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> BridgeResult<()> {
        self.balances.transfer(from, to, amount)
    }
}
