//! An in-process messaging endpoint.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use synth_bridge_primitives::{
    constants::REQUEST_ID_DOMAIN,
    types::{ChainId, RequestId},
};
use synth_bridge_protocol::messaging::{MessagingEndpoint, OutboundRequest};
use tracing::trace;

#[derive(Debug, Default)]
struct Outbox {
    /// Next nonce per source chain.
    nonces: BTreeMap<ChainId, u64>,

    /// Requests waiting to be picked up by the relayer, oldest first.
    queue: VecDeque<(RequestId, OutboundRequest)>,
}

/// Assigns request ids and queues requests until the relayer drains them.
#[derive(Debug, Default)]
pub struct LocalEndpoint {
    outbox: Mutex<Outbox>,
}

impl LocalEndpoint {
    /// Derives the id of the `nonce`-th request of its source chain.
    ///
    /// Identical requests get distinct ids as long as their nonces differ.
    pub fn request_id(request: &OutboundRequest, nonce: u64) -> RequestId {
        let digest = Sha256::new()
            .chain_update(REQUEST_ID_DOMAIN)
            .chain_update(request.source_chain.to_be_bytes())
            .chain_update(request.source_contract.as_bytes())
            .chain_update(request.destination_chain.to_be_bytes())
            .chain_update(request.destination_contract.as_bytes())
            .chain_update(nonce.to_be_bytes())
            .chain_update(&request.payload)
            .finalize();

        RequestId::new(digest.into())
    }

    /// Makes sure the next request of `source_chain` gets a nonce of at least `next_nonce`.
    ///
    /// Used when a ledger outlives the endpoint, so that new requests never reuse the id of one
    /// recorded earlier.
    pub fn resume(&self, source_chain: ChainId, next_nonce: u64) {
        let mut outbox = self.outbox.lock();
        let nonce = outbox.nonces.entry(source_chain).or_default();
        *nonce = (*nonce).max(next_nonce);
    }

    /// Takes every queued request.
    pub fn drain(&self) -> Vec<(RequestId, OutboundRequest)> {
        self.outbox.lock().queue.drain(..).collect()
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.outbox.lock().queue.len()
    }

    /// Whether no request is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessagingEndpoint for LocalEndpoint {
    fn send(&self, request: OutboundRequest) -> RequestId {
        let mut outbox = self.outbox.lock();

        let nonce = outbox.nonces.entry(request.source_chain).or_default();
        let request_id = Self::request_id(&request, *nonce);
        *nonce += 1;

        trace!(%request_id, source_chain = %request.source_chain, destination_chain = %request.destination_chain, "request queued");
        outbox.queue.push_back((request_id, request));

        request_id
    }
}

#[cfg(test)]
mod tests {
    use synth_bridge_primitives::address::Address;

    use super::*;

    fn request(source_chain: u64) -> OutboundRequest {
        OutboundRequest {
            source_chain: ChainId::new(source_chain),
            source_contract: Address::repeat_byte(0x11),
            destination_chain: ChainId::new(56),
            destination_contract: Address::repeat_byte(0x22),
            payload: vec![1, 2, 3],
        }
    }

    #[test]
    fn identical_requests_get_distinct_ids() {
        let endpoint = LocalEndpoint::default();

        let first = endpoint.send(request(1));
        let second = endpoint.send(request(1));
        let other_chain = endpoint.send(request(2));

        assert_ne!(first, second);
        // Nonces are per source chain, so the first request of chain 2 differs only by chain.
        assert_eq!(other_chain, LocalEndpoint::request_id(&request(2), 0));
        assert_eq!(second, LocalEndpoint::request_id(&request(1), 1));
    }

    #[test]
    fn resumed_nonces_only_move_forward() {
        let endpoint = LocalEndpoint::default();
        endpoint.resume(ChainId::new(1), 5);
        endpoint.resume(ChainId::new(1), 2);

        let id = endpoint.send(request(1));

        assert_eq!(id, LocalEndpoint::request_id(&request(1), 5));
        assert_eq!(
            endpoint.send(request(2)),
            LocalEndpoint::request_id(&request(2), 0)
        );
    }

    #[test]
    fn drain_empties_the_outbox_in_order() {
        let endpoint = LocalEndpoint::default();
        let ids: Vec<_> = (1..=3).map(|chain| endpoint.send(request(chain))).collect();
        assert_eq!(endpoint.len(), 3);

        let drained: Vec<_> = endpoint.drain().into_iter().map(|(id, _)| id).collect();

        assert_eq!(drained, ids);
        assert!(endpoint.is_empty());
    }
}
