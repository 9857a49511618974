//! Scenario files: a sequence of user actions, admin actions and relayer rounds.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use synth_bridge_db::ledger::RequestLedgerDb;
use synth_bridge_params::deployment::DeploymentParams;
use synth_bridge_primitives::{address::Address, amount::Amount, types::ChainId};
use synth_bridge_protocol::whitelist::TokenPolicy;
use synth_bridge_relayer::prelude::{DeliveryOutcome, DeliveryReport, Network, Relayer};
use tracing::{info, warn};

/// The steps of a scenario, executed in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) steps: Vec<Step>,
}

/// A single step.
///
/// Synthetic tokens are addressed by their origin token and origin chain since their address is
/// only known once the first delivery created them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum Step {
    /// Deposit an origin token into the Portal of `chain`.
    Lock {
        chain: ChainId,
        sender: Address,
        token: Address,
        amount: Amount,
        recipient: Address,
        destination: ChainId,
    },

    /// Move a synthetic token to another chain.
    Move {
        chain: ChainId,
        sender: Address,
        origin_token: Address,
        origin_chain: ChainId,
        amount: Amount,
        recipient: Address,
        destination: ChainId,
    },

    /// Redeem a synthetic token on its origin chain.
    Burn {
        chain: ChainId,
        sender: Address,
        origin_token: Address,
        origin_chain: ChainId,
        amount: Amount,
        recipient: Address,
    },

    /// Transfer a plain or synthetic token.
    Transfer {
        chain: ChainId,
        token: Address,
        #[serde(default)]
        origin_chain: Option<ChainId>,
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// Replace a token policy as the chain's admin.
    SetPolicy {
        chain: ChainId,
        token: Address,
        #[serde(default)]
        min: Amount,
        max: Amount,
        #[serde(default)]
        fee_bps: u64,
        #[serde(default = "enabled")]
        enabled: bool,
    },

    /// Change the cap of a synthetic token as the chain's admin.
    SetCap {
        chain: ChainId,
        origin_token: Address,
        origin_chain: ChainId,
        cap: Amount,
    },

    /// Collect queued requests and deliver everything pending.
    Relay,

    /// Hand the `index`-th delivered request to its destination again.
    Redeliver { index: usize },

    /// Fail the scenario unless `holder` has exactly `amount`.
    Expect {
        chain: ChainId,
        token: Address,
        #[serde(default)]
        origin_chain: Option<ChainId>,
        holder: Address,
        amount: Amount,
    },

    /// Log the balances of `holders`.
    Balances {
        chain: ChainId,
        token: Address,
        #[serde(default)]
        origin_chain: Option<ChainId>,
        holders: Vec<Address>,
    },
}

const fn enabled() -> bool {
    true
}

/// Executes scenario steps against a network.
#[derive(Debug)]
pub(crate) struct Runner<'a, Db> {
    params: &'a DeploymentParams,
    network: Network,
    relayer: Relayer<Db>,
    delivered: Vec<DeliveryReport>,
}

impl<'a, Db: RequestLedgerDb> Runner<'a, Db> {
    pub(crate) const fn new(
        params: &'a DeploymentParams,
        network: Network,
        relayer: Relayer<Db>,
    ) -> Self {
        Self {
            params,
            network,
            relayer,
            delivered: Vec::new(),
        }
    }

    pub(crate) async fn run(&mut self, scenario: &Scenario) -> Result<()> {
        for (index, step) in scenario.steps.iter().enumerate() {
            info!(step = index, ?step, "executing step");
            self.step(step)
                .await
                .with_context(|| format!("step {index} failed"))?;
        }

        let pending = self.relayer.db().pending().await?;
        if !pending.is_empty() {
            warn!(pending = pending.len(), "scenario ended with undelivered requests");
        }

        Ok(())
    }

    async fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Lock {
                chain,
                sender,
                token,
                amount,
                recipient,
                destination,
            } => {
                let portal = self.network.chain(*chain)?.state().info().portal;
                self.network.execute(*chain, |state| {
                    state.transfer(*sender, *token, portal, *amount)?;
                    state
                        .portal()
                        .synthesize(*sender, *token, *amount, *recipient, *destination)
                })?;
            }
            Step::Move {
                chain,
                sender,
                origin_token,
                origin_chain,
                amount,
                recipient,
                destination,
            } => {
                let synth = self.synth(*chain, *origin_token, *origin_chain)?;
                self.network.execute(*chain, |state| {
                    state
                        .synthesis()
                        .move_synth(*sender, synth, *amount, *recipient, *destination)
                })?;
            }
            Step::Burn {
                chain,
                sender,
                origin_token,
                origin_chain,
                amount,
                recipient,
            } => {
                let synth = self.synth(*chain, *origin_token, *origin_chain)?;
                self.network.execute(*chain, |state| {
                    state.synthesis().burn(*sender, synth, *amount, *recipient)
                })?;
            }
            Step::Transfer {
                chain,
                token,
                origin_chain,
                from,
                to,
                amount,
            } => {
                let token = self.token(*chain, *token, *origin_chain)?;
                self.network.execute(*chain, |state| {
                    state.transfer(*from, token, *to, *amount)
                })?;
            }
            Step::SetPolicy {
                chain,
                token,
                min,
                max,
                fee_bps,
                enabled,
            } => {
                let admin = self.admin(*chain)?;
                let policy = TokenPolicy {
                    min: *min,
                    max: *max,
                    fee_bps: *fee_bps,
                    enabled: *enabled,
                };
                self.network
                    .execute(*chain, |state| state.set_policy(admin, *token, policy))?;
            }
            Step::SetCap {
                chain,
                origin_token,
                origin_chain,
                cap,
            } => {
                let admin = self.admin(*chain)?;
                let synth = self.synth(*chain, *origin_token, *origin_chain)?;
                self.network.execute(*chain, |state| {
                    state.synthesis().set_synth_cap(admin, synth, *cap)
                })?;
            }
            Step::Relay => {
                for report in self.relayer.relay(&mut self.network).await? {
                    log_report(&report);
                    if report.is_settled() {
                        self.delivered.push(report);
                    }
                }
            }
            Step::Redeliver { index } => {
                let request_id = self
                    .delivered
                    .get(*index)
                    .map(|report| report.request_id)
                    .with_context(|| format!("only {} requests delivered", self.delivered.len()))?;
                let report = self.relayer.redeliver(&mut self.network, request_id).await?;
                log_report(&report);
            }
            Step::Expect {
                chain,
                token,
                origin_chain,
                holder,
                amount,
            } => {
                let token = self.token(*chain, *token, *origin_chain)?;
                let balance = self.network.balance_of(*chain, token, *holder)?;
                ensure!(
                    balance == *amount,
                    "{holder} holds {balance} of {token} on chain {chain}, expected {amount}"
                );
            }
            Step::Balances {
                chain,
                token,
                origin_chain,
                holders,
            } => {
                let token = self.token(*chain, *token, *origin_chain)?;
                for holder in holders {
                    let balance = self.network.balance_of(*chain, token, *holder)?;
                    info!(%chain, %token, %holder, %balance, "balance");
                }
            }
        }

        Ok(())
    }

    fn admin(&self, chain_id: ChainId) -> Result<Address> {
        self.params
            .chain(chain_id)
            .map(|chain| chain.admin)
            .with_context(|| format!("chain {chain_id} is not part of the params"))
    }

    fn synth(
        &self,
        chain_id: ChainId,
        origin_token: Address,
        origin_chain: ChainId,
    ) -> Result<Address> {
        let synth = self.network.synth_of(chain_id, origin_token, origin_chain)?;
        if synth.is_zero() {
            bail!("no synthetic {origin_token} from chain {origin_chain} exists on chain {chain_id}");
        }

        Ok(synth)
    }

    fn token(
        &self,
        chain_id: ChainId,
        token: Address,
        origin_chain: Option<ChainId>,
    ) -> Result<Address> {
        match origin_chain {
            Some(origin_chain) if origin_chain != chain_id => {
                self.synth(chain_id, token, origin_chain)
            }
            _ => Ok(token),
        }
    }

    /// Ensures origin custody covers synthetic supply for every token of the params.
    pub(crate) fn check_backing(&self) -> Result<()> {
        for token in &self.params.tokens {
            let custody = self.network.custody(token.chain_id, token.address)?;
            let supply = self.network.synthetic_supply(token.address, token.chain_id)?;
            info!(token = %token.address, origin_chain = %token.chain_id, %custody, %supply, "backing");

            ensure!(
                custody >= supply,
                "synthetic {} is under-collateralized: custody {custody}, supply {supply}",
                token.address
            );
        }

        Ok(())
    }
}

fn log_report(report: &DeliveryReport) {
    match &report.outcome {
        DeliveryOutcome::Settled => {
            info!(request_id = %report.request_id, destination = %report.destination_chain, "settled");
        }
        DeliveryOutcome::Failed { kind, reason } => {
            warn!(request_id = %report.request_id, destination = %report.destination_chain, ?kind, %reason, attempts = report.attempts, "delivery failed");
        }
        DeliveryOutcome::Ignored => {
            info!(request_id = %report.request_id, "redelivery ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use synth_bridge_db::inmemory::InMemoryRequestLedger;
    use synth_bridge_params::default::{
        DEVNET_FAUCET, DEVNET_HOME_CHAIN, DEVNET_OTHER_CHAIN, DEVNET_REMOTE_CHAIN, DEVNET_TOKEN,
    };
    use synth_bridge_relayer::prelude::RelayerConfig;

    use super::*;

    const SCENARIO: &str = r#"
        [[steps]]
        action = "lock"
        chain = 1
        sender = "0xfafafafafafafafafafafafafafafafafafafafa"
        token = "0x7070707070707070707070707070707070707070"
        amount = "10000"
        recipient = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        destination = 56

        [[steps]]
        action = "relay"

        [[steps]]
        action = "move"
        chain = 56
        sender = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        origin_token = "0x7070707070707070707070707070707070707070"
        origin_chain = 1
        amount = 5000
        recipient = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        destination = 137

        [[steps]]
        action = "relay"

        [[steps]]
        action = "redeliver"
        index = 0

        [[steps]]
        action = "expect"
        chain = 137
        token = "0x7070707070707070707070707070707070707070"
        origin_chain = 1
        holder = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"
        amount = 4995
    "#;

    fn runner(params: &DeploymentParams) -> Runner<'_, InMemoryRequestLedger> {
        let network = Network::from_params(params).unwrap();
        let relayer = Relayer::new(InMemoryRequestLedger::default(), RelayerConfig::default());
        Runner::new(params, network, relayer)
    }

    #[tokio::test]
    async fn runs_a_three_chain_scenario() {
        let scenario: Scenario = toml::from_str(SCENARIO).expect("must parse");
        assert_eq!(scenario.steps.len(), 6);
        assert_eq!(scenario.steps[1], Step::Relay);

        let params = DeploymentParams::devnet();
        let mut runner = runner(&params);
        runner.run(&scenario).await.unwrap();

        // 10000 locked at 10 bps leaves 9990 in custody; 5 of the 5000 moved stay on BSC.
        assert_eq!(
            runner
                .network
                .custody(DEVNET_HOME_CHAIN, DEVNET_TOKEN)
                .unwrap(),
            Amount::new(9_990)
        );
        assert_eq!(runner.delivered.len(), 2);
        runner.check_backing().unwrap();
    }

    #[tokio::test]
    async fn failed_expectations_name_the_step() {
        let scenario = Scenario {
            steps: vec![Step::Expect {
                chain: DEVNET_REMOTE_CHAIN,
                token: DEVNET_TOKEN,
                origin_chain: None,
                holder: DEVNET_FAUCET,
                amount: Amount::new(1),
            }],
        };

        let params = DeploymentParams::devnet();
        let err = runner(&params).run(&scenario).await.unwrap_err();
        assert_eq!(err.to_string(), "step 0 failed");
    }

    #[tokio::test]
    async fn unknown_synths_are_reported() {
        let scenario = Scenario {
            steps: vec![Step::Move {
                chain: DEVNET_OTHER_CHAIN,
                sender: DEVNET_FAUCET,
                origin_token: DEVNET_TOKEN,
                origin_chain: DEVNET_HOME_CHAIN,
                amount: Amount::new(1),
                recipient: DEVNET_FAUCET,
                destination: DEVNET_HOME_CHAIN,
            }],
        };

        let params = DeploymentParams::devnet();
        let err = runner(&params).run(&scenario).await.unwrap_err();
        assert!(format!("{err:#}").contains("no synthetic"));
    }

    #[tokio::test]
    async fn demo_scenario_runs_against_demo_params() {
        let params: DeploymentParams =
            toml::from_str(include_str!("../demos/params.toml")).expect("must parse params");
        let scenario: Scenario =
            toml::from_str(include_str!("../demos/scenario.toml")).expect("must parse scenario");

        let mut runner = runner(&params);
        runner.run(&scenario).await.unwrap();
        runner.check_backing().unwrap();
    }
}
