use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use synth_bridge_relayer::relayer::RelayerConfig;

/// Where the request ledger lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LedgerBackend {
    /// Lost when the simulator exits.
    #[default]
    Memory,

    /// A SQLite file under [`Config::datadir`].
    Sqlite,
}

/// The configuration values of the simulator.
///
/// Unlike the params, nothing here changes how the chains behave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The directory to store the request ledger in.
    #[serde(default = "default_datadir")]
    pub(crate) datadir: PathBuf,

    /// The request ledger backend.
    #[serde(default)]
    pub(crate) ledger: LedgerBackend,

    /// The relayer configuration.
    #[serde(default)]
    pub(crate) relayer: RelayerConfig,
}

fn default_datadir() -> PathBuf {
    PathBuf::from(".bridge-sim")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
            ledger: LedgerBackend::default(),
            relayer: RelayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let config: Config = toml::from_str(
            r#"
            ledger = "sqlite"

            [relayer]
            retry_limit = 5
            "#,
        )
        .expect("must parse");

        assert_eq!(config.ledger, LedgerBackend::Sqlite);
        assert_eq!(config.relayer.retry_limit, 5);
        assert_eq!(config.datadir, default_datadir());

        let empty: Config = toml::from_str("").expect("must parse");
        assert_eq!(empty, Config::default());
    }
}
