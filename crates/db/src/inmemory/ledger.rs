//! In-memory request ledger, for tests and ephemeral runs.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use synth_bridge_primitives::types::{ChainId, RequestId};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    errors::{DbError, DbResult},
    ledger::{RequestEnvelope, RequestLedgerDb, RequestRecord, RequestState},
};

#[derive(Debug, Default)]
struct Inner {
    /// Ids in the order they were recorded.
    order: Vec<RequestId>,

    /// Record of each request.
    records: HashMap<RequestId, RequestRecord>,
}

impl Inner {
    fn record_mut(&mut self, request_id: RequestId) -> DbResult<&mut RequestRecord> {
        self.records
            .get_mut(&request_id)
            .ok_or(DbError::NotFound(request_id))
    }
}

/// In-memory implementation of [`RequestLedgerDb`].
///
/// Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRequestLedger {
    inner: Arc<RwLock<Inner>>,
}

#[async_trait]
impl RequestLedgerDb for InMemoryRequestLedger {
    async fn record_sent(&self, envelope: RequestEnvelope) -> DbResult<bool> {
        let mut inner = self.inner.write().await;

        let request_id = envelope.request_id;
        if inner.records.contains_key(&request_id) {
            return Ok(false);
        }

        inner.order.push(request_id);
        inner
            .records
            .insert(request_id, RequestRecord::new(envelope));
        trace!(%request_id, "request recorded");

        Ok(true)
    }

    async fn get_request(&self, request_id: RequestId) -> DbResult<Option<RequestRecord>> {
        Ok(self.inner.read().await.records.get(&request_id).cloned())
    }

    async fn record_attempt(&self, request_id: RequestId) -> DbResult<u32> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(request_id)?;

        record.attempts += 1;

        Ok(record.attempts)
    }

    async fn set_state(&self, request_id: RequestId, state: RequestState) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(request_id)?;

        if record.state == RequestState::Settled {
            return Err(DbError::AlreadySettled(request_id));
        }
        record.state = state;

        Ok(())
    }

    async fn record_ignored(&self, request_id: RequestId) -> DbResult<u32> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(request_id)?;

        record.ignored += 1;

        Ok(record.ignored)
    }

    async fn pending(&self) -> DbResult<Vec<RequestRecord>> {
        let inner = self.inner.read().await;

        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| record.state.is_pending())
            .cloned()
            .collect())
    }

    async fn sent_count(&self, source_chain: ChainId) -> DbResult<u64> {
        let inner = self.inner.read().await;
        let count = inner
            .records
            .values()
            .filter(|record| record.envelope.source_chain == source_chain)
            .count();

        Ok(count as u64)
    }
}
