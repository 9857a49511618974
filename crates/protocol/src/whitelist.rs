//! Per-token transfer policies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    constants::{FEE_DENOMINATOR, MAX_FEE_BPS},
};
use tracing::debug;

use crate::{
    access::{AccessControl, Role},
    errors::{BridgeError, BridgeResult, PolicyViolation},
    output::BridgeEvent,
};

/// The policy applied to every transfer of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPolicy {
    /// Smallest accepted amount.
    pub min: Amount,
    /// Largest accepted amount.
    pub max: Amount,
    /// Fee rate in basis points.
    pub fee_bps: u64,
    /// Whether transfers are allowed.
    pub enabled: bool,
}

impl TokenPolicy {
    fn validate(&self, token: Address) -> BridgeResult<()> {
        if self.min > self.max {
            return Err(BridgeError::InvalidPolicy {
                token,
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }

        if self.fee_bps > MAX_FEE_BPS {
            return Err(BridgeError::InvalidPolicy {
                token,
                reason: format!("fee {} bps exceeds {MAX_FEE_BPS}", self.fee_bps),
            });
        }

        Ok(())
    }

    /// Splits `amount` into `(net, fee)` without checking bounds.
    ///
    /// `fee = floor(amount * fee_bps / 10000)` so both ends of the bridge compute the same split.
    /// The product is taken on the quotient and remainder of `amount / 10000` separately, so any
    /// amount can be quoted.
    pub fn split(&self, amount: Amount) -> BridgeResult<Quote> {
        let overflow = || BridgeError::Overflow("fee");
        let bps = Amount::from(self.fee_bps);
        let denominator = Amount::from(FEE_DENOMINATOR);

        let whole = amount
            .mul_div_floor(Amount::new(1), denominator)
            .ok_or_else(overflow)?;
        let rest = whole
            .checked_mul(denominator)
            .and_then(|floored| amount.checked_sub(floored))
            .ok_or_else(overflow)?;
        let fee = whole
            .checked_mul(bps)
            .zip(rest.mul_div_floor(bps, denominator))
            .and_then(|(high, low)| high.checked_add(low))
            .ok_or_else(overflow)?;
        let net = amount
            .checked_sub(fee)
            .ok_or(BridgeError::Overflow("net amount"))?;

        Ok(Quote { net, fee })
    }
}

/// The result of applying a policy to an amount. `net + fee` always equals the quoted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// What the destination receives.
    pub net: Amount,
    /// What the treasury keeps.
    pub fee: Amount,
}

/// The set of token policies of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    policies: BTreeMap<Address, TokenPolicy>,
    version: u64,
}

impl Whitelist {
    /// Installs or replaces the policy of `token`. Requires [`Role::Operator`].
    pub fn set_policy(
        &mut self,
        access: &AccessControl,
        caller: Address,
        token: Address,
        policy: TokenPolicy,
    ) -> BridgeResult<BridgeEvent> {
        access.require(caller, Role::Operator)?;
        policy.validate(token)?;

        self.policies.insert(token, policy);
        self.version += 1;
        debug!(%token, version = self.version, ?policy, "policy updated");

        Ok(BridgeEvent::PolicyUpdated {
            token,
            policy,
            version: self.version,
        })
    }

    /// The policy of `token`, if any.
    pub fn policy(&self, token: Address) -> Option<&TokenPolicy> {
        self.policies.get(&token)
    }

    /// Bumped on every policy change.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Checks `amount` against the policy of `token` and splits it into `(net, fee)`.
    pub fn quote(&self, token: Address, amount: Amount) -> BridgeResult<Quote> {
        let violation = |violation| BridgeError::PolicyViolation {
            token,
            amount,
            violation,
        };

        let policy = self
            .policy(token)
            .ok_or_else(|| violation(PolicyViolation::NotWhitelisted))?;

        if !policy.enabled {
            return Err(violation(PolicyViolation::Disabled));
        }
        if amount < policy.min {
            return Err(violation(PolicyViolation::BelowMin { min: policy.min }));
        }
        if amount > policy.max {
            return Err(violation(PolicyViolation::AboveMax { max: policy.max }));
        }

        policy.split(amount)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::{example_policy, one_token, ADMIN, TOKEN};

    fn whitelist(policy: TokenPolicy) -> Whitelist {
        let mut whitelist = Whitelist::default();
        whitelist
            .set_policy(&AccessControl::new(ADMIN), ADMIN, TOKEN, policy)
            .unwrap();
        whitelist
    }

    #[test]
    fn quote_splits_ten_percent() {
        let whitelist = whitelist(example_policy());

        let quote = whitelist.quote(TOKEN, one_token()).unwrap();

        assert_eq!(quote.net, Amount::new(900_000_000_000_000_000));
        assert_eq!(quote.fee, Amount::new(100_000_000_000_000_000));
    }

    #[test]
    fn quote_enforces_bounds() {
        let whitelist = whitelist(TokenPolicy {
            min: Amount::new(10),
            max: Amount::new(100),
            fee_bps: 0,
            enabled: true,
        });

        let kind = |amount: u128| match whitelist.quote(TOKEN, Amount::new(amount)) {
            Err(BridgeError::PolicyViolation { violation, .. }) => Some(violation),
            _ => None,
        };

        assert_eq!(kind(9), Some(PolicyViolation::BelowMin { min: Amount::new(10) }));
        assert_eq!(kind(101), Some(PolicyViolation::AboveMax { max: Amount::new(100) }));
        assert_eq!(kind(10), None);
        assert_eq!(kind(100), None);
        assert!(matches!(
            whitelist.quote(Address::repeat_byte(9), Amount::new(10)),
            Err(BridgeError::PolicyViolation {
                violation: PolicyViolation::NotWhitelisted,
                ..
            })
        ));
    }

    #[test]
    fn disabled_tokens_are_refused() {
        let whitelist = whitelist(TokenPolicy {
            enabled: false,
            ..example_policy()
        });

        assert!(matches!(
            whitelist.quote(TOKEN, one_token()),
            Err(BridgeError::PolicyViolation {
                violation: PolicyViolation::Disabled,
                ..
            })
        ));
    }

    #[test]
    fn set_policy_is_gated_and_validated() {
        let access = AccessControl::new(ADMIN);
        let mut whitelist = Whitelist::default();
        let stranger = Address::repeat_byte(0x55);

        assert_eq!(
            whitelist.set_policy(&access, stranger, TOKEN, example_policy()),
            Err(BridgeError::Unauthorized {
                caller: stranger,
                role: Role::Operator
            })
        );

        let inverted = TokenPolicy {
            min: Amount::new(2),
            max: Amount::new(1),
            ..example_policy()
        };
        assert!(matches!(
            whitelist.set_policy(&access, ADMIN, TOKEN, inverted),
            Err(BridgeError::InvalidPolicy { .. })
        ));

        let greedy = TokenPolicy {
            fee_bps: MAX_FEE_BPS + 1,
            ..example_policy()
        };
        assert!(whitelist.set_policy(&access, ADMIN, TOKEN, greedy).is_err());

        assert_eq!(whitelist.version(), 0);
        whitelist
            .set_policy(&access, ADMIN, TOKEN, example_policy())
            .unwrap();
        assert_eq!(whitelist.version(), 1);
    }

    #[test]
    fn split_handles_the_largest_amounts() {
        let policy = TokenPolicy {
            min: Amount::ZERO,
            max: Amount::MAX,
            fee_bps: 1_000,
            enabled: true,
        };

        let quote = whitelist(policy).quote(TOKEN, Amount::MAX).unwrap();
        assert_eq!(quote.net.checked_add(quote.fee), Some(Amount::MAX));
        assert_eq!(
            quote.fee,
            Amount::MAX
                .mul_div_floor(Amount::new(1), Amount::new(10))
                .unwrap()
        );

        let free = TokenPolicy { fee_bps: 0, ..policy }.split(Amount::MAX).unwrap();
        assert_eq!((free.net, free.fee), (Amount::MAX, Amount::ZERO));
        let all = TokenPolicy { fee_bps: MAX_FEE_BPS, ..policy }.split(Amount::MAX).unwrap();
        assert_eq!(all.net.checked_add(all.fee), Some(Amount::MAX));
    }

    proptest! {
        #[test]
        fn quote_is_deterministic_and_conserves_amount(
            amount in any::<u128>(),
            fee_bps in 0..=MAX_FEE_BPS,
        ) {
            let whitelist = whitelist(TokenPolicy {
                min: Amount::ZERO,
                max: Amount::MAX,
                fee_bps,
                enabled: true,
            });

            let amount = Amount::new(amount);
            let first = whitelist.quote(TOKEN, amount).unwrap();
            let second = whitelist.quote(TOKEN, amount).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(first.net.checked_add(first.fee), Some(amount));
        }
    }
}
