//! The messaging layer between chains, for local deployments.
//!
//! A [`Network`] hosts every chain of a deployment together with a [`LocalEndpoint`] that queues
//! the requests they emit. The [`Relayer`] moves those requests into the request ledger and
//! delivers them to their destination chain, recording each outcome so that a settled request is
//! never applied twice.
//!
//! [`Network`]: network::Network
//! [`LocalEndpoint`]: endpoint::LocalEndpoint
//! [`Relayer`]: relayer::Relayer

pub mod endpoint;
pub mod errors;
pub mod network;
pub mod relayer;

#[cfg(test)]
mod tests;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        endpoint::LocalEndpoint,
        errors::{RelayError, RelayResult},
        network::Network,
        relayer::{DeliveryOutcome, DeliveryReport, Relayer, RelayerConfig},
    };
}
