//! v1 translation backed by `shared_types::migration`.

use crate::ports::Translator;
use shared_types::{entities, migration, wire, MigrationError};

/// Default [`Translator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Translator;

impl Translator for V1Translator {
    fn block_event(
        &self,
        block: &entities::SignedBeaconBlock,
    ) -> Result<wire::EventBlock, MigrationError> {
        migration::block_to_v1_event(block)
    }

    fn unaggregated_attestation(
        &self,
        attestation: &entities::Attestation,
    ) -> Result<wire::Attestation, MigrationError> {
        Ok(migration::attestation_to_v1(attestation))
    }

    fn aggregated_attestation(
        &self,
        aggregate: &entities::SignedAggregateAttestationAndProof,
    ) -> Result<wire::SignedAggregateAttestationAndProof, MigrationError> {
        Ok(migration::aggregate_att_and_proof_to_v1(aggregate))
    }

    fn voluntary_exit(
        &self,
        exit: &entities::SignedVoluntaryExit,
    ) -> Result<wire::SignedVoluntaryExit, MigrationError> {
        Ok(migration::exit_to_v1(exit))
    }
}
