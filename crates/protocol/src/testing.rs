//! Fixtures shared by the unit tests of this crate.

use std::sync::atomic::{AtomicU64, Ordering};

use synth_bridge_primitives::{
    address::Address,
    amount::Amount,
    instruction::{BridgeAction, BridgeInstruction},
    types::{ChainId, RequestId, SynthCategory, SynthMetadata, TokenMetadata},
};

use crate::{
    address_book::Route,
    chain::{Chain, ChainInfo},
    errors::BridgeResult,
    ledger::Token,
    messaging::InboundMessage,
    output::TxOutput,
    synth_token::SyntheticToken,
    whitelist::TokenPolicy,
};

pub(crate) const ADMIN: Address = Address::repeat_byte(0xa0);
pub(crate) const ALICE: Address = Address::repeat_byte(0xa1);
pub(crate) const BOB: Address = Address::repeat_byte(0xb0);
pub(crate) const ENDPOINT: Address = Address::repeat_byte(0xe0);
pub(crate) const TOKEN: Address = Address::repeat_byte(0x70);

pub(crate) const HOME_CHAIN: ChainId = ChainId::new(1);
pub(crate) const HOME_PORTAL: Address = Address::repeat_byte(0x11);
pub(crate) const HOME_SYNTHESIS: Address = Address::repeat_byte(0x12);
pub(crate) const HOME_TREASURY: Address = Address::repeat_byte(0x13);

pub(crate) const REMOTE_CHAIN: ChainId = ChainId::new(56);
pub(crate) const REMOTE_PORTAL: Address = Address::repeat_byte(0x21);
pub(crate) const REMOTE_SYNTHESIS: Address = Address::repeat_byte(0x22);
pub(crate) const REMOTE_TREASURY: Address = Address::repeat_byte(0x23);

/// `n * 10^-d` whole tokens at 18 decimals.
pub(crate) fn tokens(n: u128, d: u32) -> Amount {
    Amount::new(n * 10u128.pow(18 - d))
}

pub(crate) fn one_token() -> Amount {
    tokens(1, 0)
}

/// 10% fee, effectively unbounded.
pub(crate) fn example_policy() -> TokenPolicy {
    TokenPolicy {
        min: Amount::ZERO,
        max: tokens(1_000_000, 0),
        fee_bps: 1_000,
        enabled: true,
    }
}

pub(crate) fn origin_metadata() -> SynthMetadata {
    SynthMetadata {
        token: TokenMetadata::new("Token", "TKN", 18),
        origin_chain_symbol: "ETH".into(),
        category: SynthCategory::Default,
    }
}

/// The synthetic representation of [`TOKEN`] as the remote Synthesis creates it.
pub(crate) fn synth_fixture() -> SyntheticToken {
    SyntheticToken::new(
        Address::repeat_byte(0x5e),
        REMOTE_SYNTHESIS,
        TOKEN,
        HOME_CHAIN,
        origin_metadata(),
        Amount::MAX,
    )
}

fn routes() -> [(ChainId, Route); 2] {
    [
        (
            HOME_CHAIN,
            Route {
                portal: HOME_PORTAL,
                synthesis: HOME_SYNTHESIS,
            },
        ),
        (
            REMOTE_CHAIN,
            Route {
                portal: REMOTE_PORTAL,
                synthesis: REMOTE_SYNTHESIS,
            },
        ),
    ]
}

fn configure(chain: &mut Chain) {
    chain
        .transact(|state| {
            for (chain_id, route) in routes() {
                state.set_route(ADMIN, chain_id, route)?;
            }
            state.set_messaging_endpoint(ADMIN, ENDPOINT)?;
            state.set_policy(ADMIN, TOKEN, example_policy())
        })
        .unwrap();
}

/// The origin chain of [`TOKEN`], with 1000 tokens held by [`ALICE`].
pub(crate) fn home_chain() -> Chain {
    let token = Token::new(TOKEN, TokenMetadata::new("Token", "TKN", 18), None)
        .with_balance(ALICE, tokens(1_000, 0))
        .unwrap();
    let info = ChainInfo {
        chain_id: HOME_CHAIN,
        symbol: "ETH".into(),
        portal: HOME_PORTAL,
        synthesis: HOME_SYNTHESIS,
        treasury: HOME_TREASURY,
    };

    let mut chain = Chain::new(info, ADMIN).with_token(token);
    configure(&mut chain);
    chain
}

/// A chain where [`TOKEN`] only exists as a synthetic token.
pub(crate) fn remote_chain() -> Chain {
    let info = ChainInfo {
        chain_id: REMOTE_CHAIN,
        symbol: "BSC".into(),
        portal: REMOTE_PORTAL,
        synthesis: REMOTE_SYNTHESIS,
        treasury: REMOTE_TREASURY,
    };

    let mut chain = Chain::new(info, ADMIN);
    configure(&mut chain);
    chain
}

pub(crate) fn deliver(
    chain: &mut Chain,
    destination_contract: Address,
    message: &InboundMessage,
) -> BridgeResult<TxOutput> {
    chain.on_receive(ENDPOINT, destination_contract, message)
}

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// A request id no other fixture message uses.
pub(crate) fn fresh_request_id() -> RequestId {
    let mut bytes = [0xf0; 32];
    bytes[24..].copy_from_slice(&NEXT_REQUEST.fetch_add(1, Ordering::Relaxed).to_be_bytes());
    RequestId::new(bytes)
}

fn message(
    source_chain: ChainId,
    source_contract: Address,
    instruction: &BridgeInstruction,
) -> InboundMessage {
    InboundMessage {
        request_id: fresh_request_id(),
        source_chain,
        source_contract,
        payload: instruction.encode().unwrap(),
    }
}

/// An unlock of [`TOKEN`] on the home chain, sent from the remote chain.
pub(crate) fn unlock_message(
    source_contract: Address,
    amount: Amount,
    recipient: Address,
) -> InboundMessage {
    let instruction = BridgeInstruction {
        action: BridgeAction::Unlock,
        token: TOKEN,
        token_chain_id: HOME_CHAIN,
        amount,
        recipient,
        origin_chain_id: REMOTE_CHAIN,
        destination_chain_id: HOME_CHAIN,
        metadata: origin_metadata(),
    };
    message(REMOTE_CHAIN, source_contract, &instruction)
}

/// A mint of synthetic [`TOKEN`] on the remote chain, sent by the home Portal.
pub(crate) fn mint_message(amount: Amount, recipient: Address) -> InboundMessage {
    let instruction = BridgeInstruction {
        action: BridgeAction::Mint,
        token: TOKEN,
        token_chain_id: HOME_CHAIN,
        amount,
        recipient,
        origin_chain_id: HOME_CHAIN,
        destination_chain_id: REMOTE_CHAIN,
        metadata: origin_metadata(),
    };
    message(HOME_CHAIN, HOME_PORTAL, &instruction)
}
