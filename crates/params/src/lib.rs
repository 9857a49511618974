//! This crate contains the parameters that describe a deployment of the bridge: which chains
//! participate, where their contracts live, which origin tokens exist and the transfer policy
//! applied to each of them.
//!
//! Every participant of a deployment must agree on these values, otherwise messages emitted by one
//! chain will be rejected as spoofed by another.

pub mod adapter;
pub mod chain;
pub mod default;
pub mod deployment;
pub mod errors;
pub mod policy;
pub mod prelude;
pub mod token;
