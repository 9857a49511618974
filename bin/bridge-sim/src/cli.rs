use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bridge-sim",
    about = "Runs bridge scenarios against a local multi-chain deployment",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        short = 'p',
        env = "BRIDGE_SIM_PARAMS",
        help = "the file containing the deployment params, the devnet deployment if omitted"
    )]
    pub(crate) params: Option<PathBuf>,

    #[arg(
        long,
        short = 'c',
        env = "BRIDGE_SIM_CONFIG",
        help = "the file containing the simulator configuration, defaults if omitted"
    )]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    /// Boot the deployment and execute a scenario file step by step.
    Run(RunArgs),

    /// Validate the deployment params and boot every chain once.
    CheckParams,
}

#[derive(Parser, Debug, Clone)]
pub(crate) struct RunArgs {
    #[arg(long, short = 's', help = "the scenario file to execute")]
    pub(crate) scenario: PathBuf,
}
