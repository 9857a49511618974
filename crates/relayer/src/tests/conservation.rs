//! Custody on the origin chain always matches synthetic supply once every request is settled.

use proptest::prelude::*;
use synth_bridge_db::prelude::RequestLedgerDb;
use synth_bridge_primitives::{amount::Amount, types::ChainId};

use crate::prelude::Network;
use super::fixtures::*;

const CHAINS: [ChainId; 3] = [ETH, BSC, POL];

#[derive(Debug, Clone)]
enum Op {
    Lock { amount: u64, to: usize },
    Move { from: usize, percent: u8, to: usize },
    Relay,
    Redeliver { index: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..1_000_000, 1usize..3).prop_map(|(amount, to)| Op::Lock { amount, to }),
        (1usize..3, 1u8..=100, 0usize..3).prop_map(|(from, percent, to)| Op::Move {
            from,
            percent,
            to
        }),
        Just(Op::Relay),
        any::<usize>().prop_map(|index| Op::Redeliver { index }),
    ]
}

fn try_lock(network: &mut Network, amount: Amount, to: ChainId) {
    let (portal, _, _) = chain_params(network, ETH);
    let _ = network.execute(ETH, |state| {
        state.transfer(ALICE, TOKEN, portal, amount)?;
        state.portal().synthesize(ALICE, TOKEN, amount, BOB, to)
    });
}

fn try_move(network: &mut Network, from: ChainId, percent: u8, to: ChainId) {
    let synth = synth(network, from);
    let held = network.balance_of(from, synth, BOB).unwrap();
    let amount = match held.mul_div_floor(Amount::new(percent.into()), Amount::new(100)) {
        Some(amount) if !amount.is_zero() => amount,
        _ => return,
    };

    let _ = network.execute(from, |state| {
        state.synthesis().move_synth(BOB, synth, amount, BOB, to)
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn custody_matches_supply(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let mut network = Network::from_params(&params()).unwrap();
            let relayer = relayer(u32::MAX);
            let mut settled = Vec::new();

            for op in ops {
                match op {
                    Op::Lock { amount, to } => {
                        try_lock(&mut network, tokens(amount.into(), 3), CHAINS[to]);
                    }
                    Op::Move { from, percent, to } => {
                        try_move(&mut network, CHAINS[from], percent, CHAINS[to]);
                    }
                    Op::Relay => {
                        for report in relayer.relay(&mut network).await.unwrap() {
                            assert!(report.is_settled(), "uncapped deliveries must settle: {report:?}");
                            settled.push(report.request_id);
                        }
                    }
                    Op::Redeliver { index } if !settled.is_empty() => {
                        let request_id = settled[index % settled.len()];
                        let before = network.synthetic_supply(TOKEN, ETH).unwrap();

                        relayer.redeliver(&mut network, request_id).await.unwrap();

                        assert_eq!(network.synthetic_supply(TOKEN, ETH).unwrap(), before);
                    }
                    Op::Redeliver { .. } => {}
                }
            }

            relayer.relay(&mut network).await.unwrap();
            assert!(relayer.db().pending().await.unwrap().is_empty());
            assert_backed(&network);
        });
    }
}
