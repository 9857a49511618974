//! Role based access control.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::address::Address;

use crate::errors::{BridgeError, BridgeResult};

/// A permission required by some operation.
///
/// Only [`Role::Admin`] and [`Role::Operator`] are granted through [`AccessControl`]. The
/// remaining roles are fixed by the contract layout and only appear in
/// [`BridgeError::Unauthorized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Configures the address book, adapters and wrapped representations and grants roles.
    Admin,
    /// Maintains token policies.
    Operator,
    /// Owner of a synthetic token.
    Owner,
    /// Minter of a plain token.
    Minter,
    /// The messaging endpoint, the only caller allowed to deliver inbound requests.
    MessagingEndpoint,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::Owner => "owner",
            Role::Minter => "minter",
            Role::MessagingEndpoint => "messaging endpoint",
        };
        write!(f, "{s}")
    }
}

/// An explicit permission set per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControl {
    grants: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    /// Creates a permission set where `admin` holds both [`Role::Admin`] and [`Role::Operator`].
    pub fn new(admin: Address) -> Self {
        let mut access = Self::default();
        access.insert(Role::Admin, admin);
        access.insert(Role::Operator, admin);
        access
    }

    fn insert(&mut self, role: Role, account: Address) {
        self.grants.entry(role).or_default().insert(account);
    }

    /// Returns `true` if `account` holds `role`.
    pub fn has_role(&self, account: Address, role: Role) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|holders| holders.contains(&account))
    }

    /// Fails with [`BridgeError::Unauthorized`] unless `caller` holds `role`.
    pub fn require(&self, caller: Address, role: Role) -> BridgeResult<()> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            Err(BridgeError::Unauthorized { caller, role })
        }
    }

    /// Grants `role` to `account`. Admin only.
    pub fn grant(&mut self, caller: Address, role: Role, account: Address) -> BridgeResult<()> {
        self.require(caller, Role::Admin)?;
        self.insert(role, account);
        Ok(())
    }

    /// Revokes `role` from `account`. Admin only.
    pub fn revoke(&mut self, caller: Address, role: Role, account: Address) -> BridgeResult<()> {
        self.require(caller, Role::Admin)?;
        if let Some(holders) = self.grants.get_mut(&role) {
            holders.remove(&account);
        }
        Ok(())
    }
}

/// Fails with [`BridgeError::Unauthorized`] unless `caller` is `expected`.
pub(crate) fn require_account(caller: Address, expected: Address, role: Role) -> BridgeResult<()> {
    if caller == expected {
        Ok(())
    } else {
        Err(BridgeError::Unauthorized { caller, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_manages_roles() {
        let admin = Address::repeat_byte(1);
        let operator = Address::repeat_byte(2);
        let mut access = AccessControl::new(admin);

        assert!(access.has_role(admin, Role::Operator));
        assert!(!access.has_role(operator, Role::Operator));

        access.grant(admin, Role::Operator, operator).unwrap();
        assert!(access.require(operator, Role::Operator).is_ok());

        assert_eq!(
            access.grant(operator, Role::Admin, operator),
            Err(BridgeError::Unauthorized {
                caller: operator,
                role: Role::Admin
            })
        );

        access.revoke(admin, Role::Operator, operator).unwrap();
        assert!(!access.has_role(operator, Role::Operator));
    }
}
