//! The encoded instruction carried by every cross-chain request.
//!
//! The same payload travels in both directions: a Portal emits [`BridgeAction::Mint`] towards a
//! Synthesis, and a Synthesis emits either [`BridgeAction::Unlock`] towards the Portal on the
//! token's home chain or [`BridgeAction::Mint`] towards another Synthesis.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    amount::Amount,
    constants::INSTRUCTION_VERSION,
    errors::{CodecError, CodecResult},
    types::{ChainId, SynthMetadata},
};

/// What the destination is asked to do with the amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum BridgeAction {
    /// Mint the synthetic representation of the origin token.
    Mint,
    /// Release (or re-mint) the origin token from Portal custody.
    Unlock,
}

impl fmt::Display for BridgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeAction::Mint => write!(f, "mint"),
            BridgeAction::Unlock => write!(f, "unlock"),
        }
    }
}

/// The payload of a cross-chain request.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct BridgeInstruction {
    /// Requested action at the destination.
    pub action: BridgeAction,
    /// Address of the origin token on its home chain.
    pub token: Address,
    /// Home chain of [`Self::token`].
    pub token_chain_id: ChainId,
    /// Amount in the token's native decimals, after fees.
    pub amount: Amount,
    /// Who receives the amount at the destination.
    pub recipient: Address,
    /// Chain on which the request was emitted.
    pub origin_chain_id: ChainId,
    /// Chain that must settle the request.
    pub destination_chain_id: ChainId,
    /// Metadata needed to create the synthetic representation on first delivery.
    pub metadata: SynthMetadata,
}

impl BridgeInstruction {
    /// Encodes the instruction as `version || borsh(instruction)`.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut bytes = vec![INSTRUCTION_VERSION];
        borsh::to_writer(&mut bytes, self).map_err(|e| CodecError::Encoding(e.to_string()))?;
        Ok(bytes)
    }

    /// Decodes an instruction produced by [`Self::encode`].
    ///
    /// Trailing bytes are rejected so that the encoding stays canonical.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let (version, body) = bytes.split_first().ok_or(CodecError::Empty)?;
        if *version != INSTRUCTION_VERSION {
            return Err(CodecError::UnsupportedVersion(*version));
        }

        borsh::from_slice(body).map_err(|e| CodecError::Decoding(e.to_string()))
    }
}

impl fmt::Display for BridgeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of {}@{} to {} ({} -> {})",
            self.action,
            self.amount,
            self.token,
            self.token_chain_id,
            self.recipient,
            self.origin_chain_id,
            self.destination_chain_id
        )
    }
}
