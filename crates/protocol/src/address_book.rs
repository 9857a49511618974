//! Trusted bridge contracts of every chain and the messaging endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use synth_bridge_primitives::{address::Address, types::ChainId};
use tracing::debug;

use crate::{
    access::{require_account, AccessControl, Role},
    errors::{BridgeError, BridgeResult},
    output::BridgeEvent,
};

/// The bridge contracts deployed on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The Portal.
    pub portal: Address,
    /// The Synthesis.
    pub synthesis: Address,
}

/// Which registered contracts an inbound request may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustedSource {
    /// Only the Synthesis of the source chain.
    Synthesis,
    /// The Portal or the Synthesis of the source chain.
    PortalOrSynthesis,
}

/// The routing table of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    routes: BTreeMap<ChainId, Route>,
    endpoint: Address,
    version: u64,
}

impl AddressBook {
    /// Registers the contracts of `chain_id`. Admin only.
    pub fn set_route(
        &mut self,
        access: &AccessControl,
        caller: Address,
        chain_id: ChainId,
        route: Route,
    ) -> BridgeResult<BridgeEvent> {
        access.require(caller, Role::Admin)?;

        self.routes.insert(chain_id, route);
        self.version += 1;
        debug!(%chain_id, portal = %route.portal, synthesis = %route.synthesis, version = self.version, "route updated");

        Ok(BridgeEvent::RouteUpdated {
            chain_id,
            portal: route.portal,
            synthesis: route.synthesis,
            version: self.version,
        })
    }

    /// Sets the messaging endpoint. Admin only.
    pub fn set_messaging_endpoint(
        &mut self,
        access: &AccessControl,
        caller: Address,
        endpoint: Address,
    ) -> BridgeResult<()> {
        access.require(caller, Role::Admin)?;

        self.endpoint = endpoint;
        self.version += 1;
        debug!(%endpoint, version = self.version, "messaging endpoint updated");

        Ok(())
    }

    /// The contracts of `chain_id`.
    pub fn route_for(&self, chain_id: ChainId) -> BridgeResult<Route> {
        self.routes
            .get(&chain_id)
            .copied()
            .ok_or(BridgeError::RouteNotRegistered {
                chain_id,
                contract: Address::ZERO,
            })
    }

    /// The messaging endpoint.
    pub const fn messaging_endpoint(&self) -> Address {
        self.endpoint
    }

    /// Bumped on every change.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Fails unless `caller` is the messaging endpoint.
    pub fn require_endpoint(&self, caller: Address) -> BridgeResult<()> {
        if self.endpoint.is_zero() {
            return Err(BridgeError::Unauthorized {
                caller,
                role: Role::MessagingEndpoint,
            });
        }

        require_account(caller, self.endpoint, Role::MessagingEndpoint)
    }

    /// Fails unless `contract` is a registered contract of `chain_id` of the trusted kind.
    pub fn authorize_source(
        &self,
        chain_id: ChainId,
        contract: Address,
        trusted: TrustedSource,
    ) -> BridgeResult<()> {
        let not_registered = BridgeError::RouteNotRegistered { chain_id, contract };
        let route = self.routes.get(&chain_id).ok_or(not_registered.clone())?;

        let trusted = match trusted {
            TrustedSource::Synthesis => contract == route.synthesis,
            TrustedSource::PortalOrSynthesis => {
                contract == route.synthesis || contract == route.portal
            }
        };

        if trusted && !contract.is_zero() {
            Ok(())
        } else {
            Err(not_registered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        ADMIN, ENDPOINT, HOME_CHAIN, HOME_PORTAL, HOME_SYNTHESIS, REMOTE_CHAIN, REMOTE_PORTAL,
        REMOTE_SYNTHESIS,
    };

    fn book() -> AddressBook {
        let access = AccessControl::new(ADMIN);
        let mut book = AddressBook::default();
        book.set_route(
            &access,
            ADMIN,
            REMOTE_CHAIN,
            Route {
                portal: REMOTE_PORTAL,
                synthesis: REMOTE_SYNTHESIS,
            },
        )
        .unwrap();
        book.set_messaging_endpoint(&access, ADMIN, ENDPOINT).unwrap();
        book
    }

    #[test]
    fn routes_are_admin_only() {
        let access = AccessControl::new(ADMIN);
        let mut book = AddressBook::default();
        let route = Route {
            portal: HOME_PORTAL,
            synthesis: HOME_SYNTHESIS,
        };

        assert!(matches!(
            book.set_route(&access, ENDPOINT, HOME_CHAIN, route),
            Err(BridgeError::Unauthorized { role: Role::Admin, .. })
        ));
        assert!(book.set_messaging_endpoint(&access, ENDPOINT, ENDPOINT).is_err());
        assert_eq!(book.version(), 0);

        book.set_route(&access, ADMIN, HOME_CHAIN, route).unwrap();
        assert_eq!(book.route_for(HOME_CHAIN), Ok(route));
        assert_eq!(book.version(), 1);
    }

    #[test]
    fn spoofed_sources_are_rejected() {
        let book = book();

        assert!(book
            .authorize_source(REMOTE_CHAIN, REMOTE_SYNTHESIS, TrustedSource::Synthesis)
            .is_ok());
        assert!(book
            .authorize_source(REMOTE_CHAIN, REMOTE_PORTAL, TrustedSource::PortalOrSynthesis)
            .is_ok());

        assert_eq!(
            book.authorize_source(REMOTE_CHAIN, REMOTE_PORTAL, TrustedSource::Synthesis),
            Err(BridgeError::RouteNotRegistered {
                chain_id: REMOTE_CHAIN,
                contract: REMOTE_PORTAL
            })
        );
        assert!(book
            .authorize_source(HOME_CHAIN, REMOTE_SYNTHESIS, TrustedSource::PortalOrSynthesis)
            .is_err());
    }

    #[test]
    fn only_the_endpoint_delivers() {
        let book = book();

        assert!(book.require_endpoint(ENDPOINT).is_ok());
        assert_eq!(
            book.require_endpoint(ADMIN),
            Err(BridgeError::Unauthorized {
                caller: ADMIN,
                role: Role::MessagingEndpoint
            })
        );
        assert!(AddressBook::default().require_endpoint(Address::ZERO).is_err());
    }
}
