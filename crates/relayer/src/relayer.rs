//! Delivery of queued requests to their destination chain.

use serde::{Deserialize, Serialize};
use synth_bridge_db::ledger::{RequestEnvelope, RequestLedgerDb, RequestState};
use synth_bridge_primitives::types::{ChainId, RequestId};
use synth_bridge_protocol::{errors::ErrorKind, messaging::OutboundRequest, output::BridgeEvent};
use tracing::{debug, error, info, warn};

use crate::{
    errors::{RelayError, RelayResult},
    network::Network,
};

/// Attempts made by [`Relayer::relay`] before a request is left for manual redelivery.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Configuration of the [`Relayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Delivery attempts per request before [`Relayer::relay`] stops retrying it.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

const fn default_retry_limit() -> u32 {
    DEFAULT_RETRY_LIMIT
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }
}

/// What happened to a request handed to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The destination contract accepted it.
    Settled,
    /// The destination rejected it. The request stays pending.
    Failed {
        /// The bridge error taxonomy tag, if a contract rejected the request.
        kind: Option<ErrorKind>,
        /// The rendered error.
        reason: String,
    },
    /// The request was already settled and was not handed to the chain again.
    Ignored,
}

/// The outcome of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// The request.
    pub request_id: RequestId,
    /// Where it was delivered.
    pub destination_chain: ChainId,
    /// Attempts made so far, this one included.
    pub attempts: u32,
    /// What happened.
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    /// Whether the request was settled by this delivery.
    pub const fn is_settled(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Settled)
    }
}

/// Moves requests from the endpoint into the request ledger and delivers them at least once.
///
/// The ledger is the replay guard: a request recorded as settled is never handed to a chain again,
/// no matter how often it is redelivered.
#[derive(Debug)]
pub struct Relayer<Db> {
    db: Db,
    config: RelayerConfig,
}

impl<Db: RequestLedgerDb> Relayer<Db> {
    /// Creates a relayer on top of `db`.
    pub const fn new(db: Db, config: RelayerConfig) -> Self {
        Self { db, config }
    }

    /// The request ledger.
    pub const fn db(&self) -> &Db {
        &self.db
    }

    /// Prepares `network` to relay on top of a ledger that may already hold requests.
    ///
    /// Seeds the endpoint nonces of every chain past the requests the ledger has recorded for it
    /// and returns how many recorded requests are still unsettled.
    pub async fn resume(&self, network: &Network) -> RelayResult<usize> {
        for chain_id in network.chain_ids() {
            let sent = self.db.sent_count(chain_id).await?;
            if sent > 0 {
                debug!(%chain_id, sent, "resuming endpoint nonces");
                network.endpoint().resume(chain_id, sent);
            }
        }

        let pending = self.db.pending().await?.len();
        if pending > 0 {
            warn!(pending, "request ledger holds unsettled requests");
        }
        Ok(pending)
    }

    /// Records every request queued at the endpoint and returns how many were recorded.
    ///
    /// Fails if the ledger already holds one of the ids, since the request behind it would never
    /// be delivered.
    pub async fn collect(&self, network: &Network) -> RelayResult<usize> {
        let mut recorded = 0;
        for (request_id, request) in network.endpoint().drain() {
            if !self.db.record_sent(envelope(request_id, request)).await? {
                error!(%request_id, "request id collides with a recorded request");
                return Err(RelayError::DuplicateRequest(request_id));
            }
            recorded += 1;
        }

        if recorded > 0 {
            debug!(recorded, "collected requests");
        }
        Ok(recorded)
    }

    /// Collects queued requests and attempts every pending request that is still below the retry
    /// limit, oldest first.
    pub async fn relay(&self, network: &mut Network) -> RelayResult<Vec<DeliveryReport>> {
        self.collect(network).await?;

        let mut reports = Vec::new();
        for record in self.db.pending().await? {
            let request_id = record.envelope.request_id;
            if record.attempts >= self.config.retry_limit {
                debug!(%request_id, attempts = record.attempts, "retry limit reached, skipping");
                continue;
            }

            reports.push(self.attempt(network, &record.envelope).await?);
        }

        Ok(reports)
    }

    /// Hands a recorded request to its destination again.
    ///
    /// Settled requests are counted as ignored and left untouched. The retry limit does not apply.
    pub async fn redeliver(
        &self,
        network: &mut Network,
        request_id: RequestId,
    ) -> RelayResult<DeliveryReport> {
        let record = self
            .db
            .get_request(request_id)
            .await?
            .ok_or(RelayError::UnknownRequest(request_id))?;

        if record.state.is_pending() {
            return self.attempt(network, &record.envelope).await;
        }

        let ignored = self.db.record_ignored(request_id).await?;
        info!(%request_id, ignored, "redelivery of a settled request ignored");

        Ok(DeliveryReport {
            request_id,
            destination_chain: record.envelope.destination_chain,
            attempts: record.attempts,
            outcome: DeliveryOutcome::Ignored,
        })
    }

    async fn attempt(
        &self,
        network: &mut Network,
        envelope: &RequestEnvelope,
    ) -> RelayResult<DeliveryReport> {
        let request_id = envelope.request_id;
        let attempts = self.db.record_attempt(request_id).await?;

        let outcome = match network.deliver(envelope) {
            Ok(output) => {
                self.db.set_state(request_id, RequestState::Settled).await?;
                let replayed = output
                    .events
                    .iter()
                    .any(|event| matches!(event, BridgeEvent::Ignored { .. }));
                info!(%request_id, destination_chain = %envelope.destination_chain, attempts, replayed, "request delivered");

                DeliveryOutcome::Settled
            }
            Err(err @ (RelayError::Bridge { .. } | RelayError::UnknownChain(_))) => {
                let reason = err.to_string();
                error!(%request_id, destination_chain = %envelope.destination_chain, attempts, %reason, "delivery failed");

                self.db
                    .set_state(
                        request_id,
                        RequestState::Failed {
                            reason: reason.clone(),
                        },
                    )
                    .await?;

                DeliveryOutcome::Failed {
                    kind: err.bridge_error().map(|source| source.kind()),
                    reason,
                }
            }
            Err(err) => return Err(err),
        };

        Ok(DeliveryReport {
            request_id,
            destination_chain: envelope.destination_chain,
            attempts,
            outcome,
        })
    }
}

fn envelope(request_id: RequestId, request: OutboundRequest) -> RequestEnvelope {
    RequestEnvelope {
        request_id,
        source_chain: request.source_chain,
        source_contract: request.source_contract,
        destination_chain: request.destination_chain,
        destination_contract: request.destination_contract,
        payload: request.payload,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use synth_bridge_db::{
        errors::{DbError, DbResult},
        inmemory::InMemoryRequestLedger,
        ledger::RequestRecord,
    };
    use synth_bridge_params::{
        default::{DEVNET_FAUCET, DEVNET_HOME_CHAIN, DEVNET_REMOTE_CHAIN, DEVNET_TOKEN},
        deployment::DeploymentParams,
    };
    use synth_bridge_primitives::amount::Amount;

    use super::*;

    fn lock(network: &mut Network, amount: Amount) {
        let portal = network.chain(DEVNET_HOME_CHAIN).unwrap().state().info().portal;
        network
            .execute(DEVNET_HOME_CHAIN, |state| {
                state.transfer(DEVNET_FAUCET, DEVNET_TOKEN, portal, amount)?;
                state.portal().synthesize(
                    DEVNET_FAUCET,
                    DEVNET_TOKEN,
                    amount,
                    DEVNET_FAUCET,
                    DEVNET_REMOTE_CHAIN,
                )
            })
            .unwrap();
    }

    /// Loses the first write that marks a request settled.
    #[derive(Debug, Default)]
    struct FlakyLedger {
        inner: InMemoryRequestLedger,
        failed: AtomicBool,
    }

    #[async_trait]
    impl RequestLedgerDb for FlakyLedger {
        async fn record_sent(&self, envelope: RequestEnvelope) -> DbResult<bool> {
            self.inner.record_sent(envelope).await
        }

        async fn get_request(&self, request_id: RequestId) -> DbResult<Option<RequestRecord>> {
            self.inner.get_request(request_id).await
        }

        async fn record_attempt(&self, request_id: RequestId) -> DbResult<u32> {
            self.inner.record_attempt(request_id).await
        }

        async fn set_state(&self, request_id: RequestId, state: RequestState) -> DbResult<()> {
            if state == RequestState::Settled && !self.failed.swap(true, Ordering::SeqCst) {
                return Err(DbError::NotFound(request_id));
            }
            self.inner.set_state(request_id, state).await
        }

        async fn record_ignored(&self, request_id: RequestId) -> DbResult<u32> {
            self.inner.record_ignored(request_id).await
        }

        async fn pending(&self) -> DbResult<Vec<RequestRecord>> {
            self.inner.pending().await
        }

        async fn sent_count(&self, source_chain: ChainId) -> DbResult<u64> {
            self.inner.sent_count(source_chain).await
        }
    }

    #[test]
    fn config_defaults_the_retry_limit() {
        let config: RelayerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RelayerConfig::default());
        assert_eq!(config.retry_limit, DEFAULT_RETRY_LIMIT);
    }

    #[tokio::test]
    async fn settled_requests_are_never_applied_twice() {
        let mut network = Network::from_params(&DeploymentParams::devnet()).unwrap();
        let relayer = Relayer::new(InMemoryRequestLedger::default(), RelayerConfig::default());
        let amount = Amount::new(1_000);

        lock(&mut network, amount);
        let reports = relayer.relay(&mut network).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_settled());

        let synth = network
            .synth_of(DEVNET_REMOTE_CHAIN, DEVNET_TOKEN, DEVNET_HOME_CHAIN)
            .unwrap();
        let balance = network
            .balance_of(DEVNET_REMOTE_CHAIN, synth, DEVNET_FAUCET)
            .unwrap();
        assert_eq!(balance, Amount::new(999));

        let report = relayer
            .redeliver(&mut network, reports[0].request_id)
            .await
            .unwrap();
        assert_eq!(report.outcome, DeliveryOutcome::Ignored);
        assert_eq!(
            network
                .balance_of(DEVNET_REMOTE_CHAIN, synth, DEVNET_FAUCET)
                .unwrap(),
            balance
        );
        assert!(relayer.relay(&mut network).await.unwrap().is_empty());

        let record = relayer
            .db()
            .get_request(reports[0].request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.attempts, 1);
        assert_eq!(record.ignored, 1);
    }

    #[tokio::test]
    async fn unknown_requests_cannot_be_redelivered() {
        let mut network = Network::from_params(&DeploymentParams::devnet()).unwrap();
        let relayer = Relayer::new(InMemoryRequestLedger::default(), RelayerConfig::default());

        assert!(matches!(
            relayer
                .redeliver(&mut network, RequestId::new([7; 32]))
                .await,
            Err(RelayError::UnknownRequest(_))
        ));
    }

    #[tokio::test]
    async fn lost_settlement_writes_do_not_credit_twice() {
        let mut network = Network::from_params(&DeploymentParams::devnet()).unwrap();
        let relayer = Relayer::new(FlakyLedger::default(), RelayerConfig::default());

        lock(&mut network, Amount::new(1_000));
        assert!(matches!(
            relayer.relay(&mut network).await,
            Err(RelayError::Db(_))
        ));

        let reports = relayer.relay(&mut network).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_settled());
        assert_eq!(reports[0].attempts, 2);

        let synth = network
            .synth_of(DEVNET_REMOTE_CHAIN, DEVNET_TOKEN, DEVNET_HOME_CHAIN)
            .unwrap();
        assert_eq!(
            network
                .balance_of(DEVNET_REMOTE_CHAIN, synth, DEVNET_FAUCET)
                .unwrap(),
            Amount::new(999)
        );
        assert_eq!(
            network.custody(DEVNET_HOME_CHAIN, DEVNET_TOKEN).unwrap(),
            network
                .synthetic_supply(DEVNET_TOKEN, DEVNET_HOME_CHAIN)
                .unwrap()
        );
        assert!(relayer.db().pending().await.unwrap().is_empty());
    }
}
