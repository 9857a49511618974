//! The treasury collaborator that is told about collected fees.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use synth_bridge_primitives::{address::Address, amount::Amount, types::ChainId};
use tracing::{trace, warn};

use crate::output::FeeCredit;

/// Receives fee notifications.
///
/// The fee itself already sits at the chain's treasury address when this is called; the
/// collaborator only keeps its own books and is assumed infallible.
pub trait Treasury: Send + Sync {
    /// Records a collected fee.
    fn credit(&self, credit: &FeeCredit);
}

/// A [`Treasury`] that keeps running totals in memory.
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    totals: Mutex<BTreeMap<(ChainId, Address), Amount>>,
}

impl InMemoryTreasury {
    /// The total collected in `token` on `chain_id`.
    pub fn collected(&self, chain_id: ChainId, token: Address) -> Amount {
        self.totals
            .lock()
            .get(&(chain_id, token))
            .copied()
            .unwrap_or_default()
    }
}

impl Treasury for InMemoryTreasury {
    fn credit(&self, credit: &FeeCredit) {
        let mut totals = self.totals.lock();
        let total = totals.entry((credit.chain_id, credit.token)).or_default();

        match total.checked_add(credit.amount) {
            Some(updated) => *total = updated,
            None => warn!(chain_id = %credit.chain_id, token = %credit.token, "treasury total saturated"),
        }

        trace!(chain_id = %credit.chain_id, token = %credit.token, amount = %credit.amount, reason = ?credit.reason, "fee credited");
    }
}
