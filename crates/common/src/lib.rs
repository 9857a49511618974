//! Utilities shared by the bridge's binaries, such as setting up the tracing framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
