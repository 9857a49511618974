//! Fungible token balances.
//!
//! [`Balances`] is the bookkeeping shared by every token on a chain. [`TokenLedger`] holds the
//! plain tokens (origin tokens, third-party tokens, wrapped representations and pool shares);
//! synthetic tokens keep their own [`Balances`] inside the
//! [`SynthRegistry`](crate::registry::SynthRegistry).

use std::collections::BTreeMap;

use synth_bridge_primitives::{address::Address, amount::Amount, types::TokenMetadata};

use crate::{
    access::{require_account, Role},
    errors::{BridgeError, BridgeResult},
};

/// Balances and total supply of a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balances {
    token: Address,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
}

impl Balances {
    /// Creates empty balances for `token`.
    pub const fn new(token: Address) -> Self {
        Self {
            token,
            total_supply: Amount::ZERO,
            balances: BTreeMap::new(),
        }
    }

    /// The total supply.
    pub const fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// The balance of `holder`.
    pub fn balance_of(&self, holder: Address) -> Amount {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    /// Iterates over non-zero balances.
    pub fn holders(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.balances.iter().map(|(holder, amount)| (*holder, *amount))
    }

    /// Creates `amount` for `to`. Callers are responsible for checking authority and caps.
    pub(crate) fn mint(&mut self, to: Address, amount: Amount) -> BridgeResult<()> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("total supply"))?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("balance"))?;

        self.total_supply = total_supply;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Destroys `amount` held by `from`.
    pub(crate) fn burn(&mut self, from: Address, amount: Amount) -> BridgeResult<()> {
        let balance = self.debit(from, amount)?;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(BridgeError::Overflow("total supply"))?;
        self.set_balance(from, balance);
        Ok(())
    }

    /// Moves `amount` from `from` to `to`.
    pub(crate) fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> BridgeResult<()> {
        let from_balance = self.debit(from, amount)?;
        self.set_balance(from, from_balance);

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("balance"))?;
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn debit(&self, holder: Address, amount: Amount) -> BridgeResult<Amount> {
        let balance = self.balance_of(holder);
        balance
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientBalance {
                token: self.token,
                holder,
                balance,
                amount,
            })
    }

    fn set_balance(&mut self, holder: Address, balance: Amount) {
        if balance.is_zero() {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }
}

/// A plain fungible token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    address: Address,
    metadata: TokenMetadata,
    minter: Option<Address>,
    balances: Balances,
}

impl Token {
    /// Creates a token with no supply.
    pub const fn new(address: Address, metadata: TokenMetadata, minter: Option<Address>) -> Self {
        Self {
            address,
            metadata,
            minter,
            balances: Balances::new(address),
        }
    }

    /// Adds an initial balance. Only meant for genesis.
    pub fn with_balance(mut self, holder: Address, amount: Amount) -> BridgeResult<Self> {
        self.balances.mint(holder, amount)?;
        Ok(self)
    }

    /// The token's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The token's metadata.
    pub const fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// The account allowed to mint and burn, if any.
    pub const fn minter(&self) -> Option<Address> {
        self.minter
    }

    /// The token's balances.
    pub const fn balances(&self) -> &Balances {
        &self.balances
    }

    fn require_minter(&self, caller: Address) -> BridgeResult<()> {
        let minter = self.minter.unwrap_or(Address::ZERO);
        if minter.is_zero() {
            return Err(BridgeError::Unauthorized {
                caller,
                role: Role::Minter,
            });
        }

        require_account(caller, minter, Role::Minter)
    }
}

/// All plain tokens on a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    tokens: BTreeMap<Address, Token>,
}

impl TokenLedger {
    /// Adds a token. Returns `false` and leaves the ledger untouched if the address is taken.
    pub fn insert(&mut self, token: Token) -> bool {
        if self.tokens.contains_key(&token.address) {
            return false;
        }

        self.tokens.insert(token.address, token);
        true
    }

    /// Returns `true` if the token exists.
    pub fn contains(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }

    /// Looks up a token.
    pub fn token(&self, token: Address) -> BridgeResult<&Token> {
        self.tokens.get(&token).ok_or(BridgeError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> BridgeResult<&mut Token> {
        self.tokens
            .get_mut(&token)
            .ok_or(BridgeError::UnknownToken(token))
    }

    /// Iterates over all tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.values()
    }

    /// The balance of `holder`, zero for unknown tokens.
    pub fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.tokens
            .get(&token)
            .map(|t| t.balances.balance_of(holder))
            .unwrap_or_default()
    }

    /// The total supply, zero for unknown tokens.
    pub fn total_supply(&self, token: Address) -> Amount {
        self.tokens
            .get(&token)
            .map(|t| t.balances.total_supply())
            .unwrap_or_default()
    }

    /// Moves `amount` of `token` from `from` to `to`.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> BridgeResult<()> {
        self.token_mut(token)?.balances.transfer(from, to, amount)
    }

    /// Mints `amount` of `token` to `to`. Only the token's minter may call this.
    pub fn mint(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> BridgeResult<()> {
        let token = self.token_mut(token)?;
        token.require_minter(caller)?;
        token.balances.mint(to, amount)
    }

    /// Burns `amount` of `token` held by `from`. Only the token's minter may call this.
    pub fn burn(
        &mut self,
        caller: Address,
        token: Address,
        from: Address,
        amount: Amount,
    ) -> BridgeResult<()> {
        let token = self.token_mut(token)?;
        token.require_minter(caller)?;
        token.balances.burn(from, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Address = Address::repeat_byte(0x70);
    const MINTER: Address = Address::repeat_byte(0x0a);
    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    fn ledger() -> TokenLedger {
        let mut ledger = TokenLedger::default();
        let token = Token::new(TOKEN, TokenMetadata::new("Token", "TKN", 18), Some(MINTER))
            .with_balance(ALICE, Amount::new(100))
            .unwrap();
        assert!(ledger.insert(token));
        ledger
    }

    #[test]
    fn transfer_moves_balance_without_changing_supply() {
        let mut ledger = ledger();

        ledger.transfer(TOKEN, ALICE, BOB, Amount::new(40)).unwrap();

        assert_eq!(ledger.balance_of(TOKEN, ALICE), Amount::new(60));
        assert_eq!(ledger.balance_of(TOKEN, BOB), Amount::new(40));
        assert_eq!(ledger.total_supply(TOKEN), Amount::new(100));
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let mut ledger = ledger();

        let err = ledger
            .transfer(TOKEN, BOB, ALICE, Amount::new(1))
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::InsufficientBalance {
                token: TOKEN,
                holder: BOB,
                balance: Amount::ZERO,
                amount: Amount::new(1),
            }
        );
    }

    #[test]
    fn only_the_minter_changes_supply() {
        let mut ledger = ledger();

        assert!(matches!(
            ledger.mint(ALICE, TOKEN, ALICE, Amount::new(1)),
            Err(BridgeError::Unauthorized {
                role: Role::Minter,
                ..
            })
        ));

        ledger.mint(MINTER, TOKEN, BOB, Amount::new(5)).unwrap();
        ledger.burn(MINTER, TOKEN, ALICE, Amount::new(10)).unwrap();

        assert_eq!(ledger.total_supply(TOKEN), Amount::new(95));
        assert_eq!(ledger.balance_of(TOKEN, BOB), Amount::new(5));
    }

    #[test]
    fn tokens_without_minter_are_fixed_supply() {
        let mut ledger = TokenLedger::default();
        ledger.insert(Token::new(TOKEN, TokenMetadata::new("Token", "TKN", 6), None));

        assert!(ledger.mint(Address::ZERO, TOKEN, ALICE, Amount::new(1)).is_err());
        assert!(!ledger.insert(Token::new(TOKEN, TokenMetadata::new("Other", "OTH", 6), None)));
        assert_eq!(ledger.token(TOKEN).unwrap().metadata().symbol, "TKN");
    }
}
