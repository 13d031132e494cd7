//! # Migration
//!
//! Conversions from internal entities to their v1 wire form.

use crate::entities;
use crate::errors::MigrationError;
use crate::wire::{self, SIGNATURE_LENGTH};

/// Convert a signed block of any fork into a v1 signed header.
///
/// The body is replaced by its content hash. Fails if the block signature is
/// not a full BLS signature or the body cannot be encoded.
pub fn block_to_v1_header(
    block: &entities::SignedBeaconBlock,
) -> Result<wire::SignedBeaconBlockHeader, MigrationError> {
    let signature = block.signature();
    if signature.len() != SIGNATURE_LENGTH {
        return Err(MigrationError::InvalidSignatureLength {
            expected: SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    Ok(wire::SignedBeaconBlockHeader {
        message: wire::BeaconBlockHeader {
            slot: block.slot(),
            proposer_index: block.proposer_index(),
            parent_root: block.parent_root(),
            state_root: block.state_root(),
            body_root: block.body_root()?,
        },
        signature: signature.to_vec(),
    })
}

/// Reduce a signed block to the `block` event payload: its slot and root.
pub fn block_to_v1_event(
    block: &entities::SignedBeaconBlock,
) -> Result<wire::EventBlock, MigrationError> {
    let header = block_to_v1_header(block)?;
    Ok(wire::EventBlock {
        slot: header.message.slot,
        block: header.block_root()?,
    })
}

fn checkpoint_to_v1(checkpoint: &entities::Checkpoint) -> wire::Checkpoint {
    wire::Checkpoint {
        epoch: checkpoint.epoch,
        root: checkpoint.root,
    }
}

/// Convert an unaggregated attestation.
#[must_use]
pub fn attestation_to_v1(attestation: &entities::Attestation) -> wire::Attestation {
    let data = &attestation.data;
    wire::Attestation {
        aggregation_bits: attestation.aggregation_bits.clone(),
        data: wire::AttestationData {
            slot: data.slot,
            index: data.committee_index,
            beacon_block_root: data.beacon_block_root,
            source: checkpoint_to_v1(&data.source),
            target: checkpoint_to_v1(&data.target),
        },
        signature: attestation.signature.clone(),
    }
}

/// Convert a signed aggregate and its proof.
#[must_use]
pub fn aggregate_att_and_proof_to_v1(
    aggregate: &entities::SignedAggregateAttestationAndProof,
) -> wire::SignedAggregateAttestationAndProof {
    wire::SignedAggregateAttestationAndProof {
        message: wire::AggregateAttestationAndProof {
            aggregator_index: aggregate.message.aggregator_index,
            aggregate: attestation_to_v1(&aggregate.message.aggregate),
            selection_proof: aggregate.message.selection_proof.clone(),
        },
        signature: aggregate.signature.clone(),
    }
}

/// Convert a signed voluntary exit.
#[must_use]
pub fn exit_to_v1(exit: &entities::SignedVoluntaryExit) -> wire::SignedVoluntaryExit {
    wire::SignedVoluntaryExit {
        message: wire::VoluntaryExit {
            epoch: exit.exit.epoch,
            validator_index: exit.exit.validator_index,
        },
        signature: exit.signature.clone(),
    }
}
