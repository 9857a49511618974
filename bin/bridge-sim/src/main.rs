//! Runs bridge scenarios against a local multi-chain deployment.

mod cli;
mod config;
mod scenario;

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, LedgerBackend};
use scenario::{Runner, Scenario};
use serde::de::DeserializeOwned;
use synth_bridge_common::logging::{self, LoggerConfig};
use synth_bridge_db::prelude::{InMemoryRequestLedger, RequestLedgerDb, SqliteRequestLedger};
use synth_bridge_params::prelude::DeploymentParams;
use synth_bridge_relayer::prelude::{Network, Relayer};
use tracing::{debug, info, trace};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(LoggerConfig::from_env("bridge-sim")).context("failed to initialize logging")?;

    let cli = Cli::parse();
    let params = match &cli.params {
        Some(path) => parse_toml::<DeploymentParams>(path)?,
        None => DeploymentParams::devnet(),
    };
    let config = match &cli.config {
        Some(path) => parse_toml::<Config>(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::CheckParams => {
            let network = Network::from_params(&params).context("params are invalid")?;
            info!(chains = network.chain_ids().count(), "params are valid");
            Ok(())
        }
        Commands::Run(args) => {
            let scenario = parse_toml::<Scenario>(&args.scenario)?;
            info!(steps = scenario.steps.len(), ledger = ?config.ledger, "running scenario");

            match config.ledger {
                LedgerBackend::Memory => {
                    let db = InMemoryRequestLedger::default();
                    run(&params, &config, &scenario, db).await
                }
                LedgerBackend::Sqlite => {
                    fs::create_dir_all(&config.datadir).with_context(|| {
                        format!("failed to create datadir {}", config.datadir.display())
                    })?;
                    let db = SqliteRequestLedger::open(&config.datadir)
                        .await
                        .context("failed to open the request ledger")?;
                    run(&params, &config, &scenario, db).await
                }
            }
        }
    }
}

async fn run<Db: RequestLedgerDb>(
    params: &DeploymentParams,
    config: &Config,
    scenario: &Scenario,
    db: Db,
) -> Result<()> {
    let network = Network::from_params(params).context("failed to boot the network")?;
    let relayer = Relayer::new(db, config.relayer);

    // Chains start from genesis on every run, so requests left unsettled by an earlier run have
    // nothing backing them here.
    let stale = relayer
        .resume(&network)
        .await
        .context("failed to resume the request ledger")?;
    if stale > 0 {
        bail!(
            "the request ledger in {} holds {stale} unsettled requests from an earlier run, remove it to start over",
            config.datadir.display()
        );
    }

    let mut runner = Runner::new(params, network, relayer);
    runner.run(scenario).await?;
    runner.check_backing()?;

    info!("scenario complete");
    Ok(())
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?path, "read file");

    let parsed = toml::from_str::<T>(&contents)
        .with_context(|| format!("failed to parse TOML file {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use synth_bridge_db::prelude::RequestEnvelope;
    use synth_bridge_primitives::{
        address::Address,
        types::{ChainId, RequestId},
    };

    use super::*;

    const DEMO_PARAMS: &str = include_str!("../demos/params.toml");
    const DEMO_SCENARIO: &str = include_str!("../demos/scenario.toml");

    fn demo() -> (DeploymentParams, Scenario) {
        (
            toml::from_str(DEMO_PARAMS).expect("demo params must parse"),
            toml::from_str(DEMO_SCENARIO).expect("demo scenario must parse"),
        )
    }

    #[tokio::test]
    async fn demo_scenario_reruns_on_a_persistent_ledger() {
        let datadir = tempfile::tempdir().unwrap();
        let config = Config {
            datadir: datadir.path().to_path_buf(),
            ledger: LedgerBackend::Sqlite,
            ..Config::default()
        };
        let (params, scenario) = demo();

        for _ in 0..2 {
            let db = SqliteRequestLedger::open(&config.datadir).await.unwrap();
            run(&params, &config, &scenario, db).await.unwrap();
        }

        let db = SqliteRequestLedger::open(&config.datadir).await.unwrap();
        assert!(db.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsettled_requests_from_an_earlier_run_are_refused() {
        let (params, scenario) = demo();
        let db = InMemoryRequestLedger::default();
        db.record_sent(RequestEnvelope {
            request_id: RequestId::new([1; 32]),
            source_chain: ChainId::new(1),
            source_contract: Address::repeat_byte(0x11),
            destination_chain: ChainId::new(56),
            destination_contract: Address::repeat_byte(0x22),
            payload: Vec::new(),
        })
        .await
        .unwrap();

        let err = run(&params, &Config::default(), &scenario, db)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 unsettled requests"), "{err}");
    }
}
