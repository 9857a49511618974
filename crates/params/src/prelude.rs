//! Re-exports of all parameter types.

pub use crate::{
    adapter::{AdapterKind, AdapterParams},
    chain::ChainParams,
    deployment::DeploymentParams,
    errors::{ParamsError, ParamsResult},
    policy::PolicyParams,
    token::{BalanceParams, TokenParams},
};
