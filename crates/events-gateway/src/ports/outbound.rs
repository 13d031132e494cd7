//! Outbound ports for the events gateway.
//!
//! The multiplexing loop reaches the outside world through two seams: the
//! translation from internal entities to v1 wire messages, and the stream it
//! writes envelopes to.

use crate::domain::{Envelope, SinkError};
use async_trait::async_trait;
use shared_types::{entities, wire, MigrationError};

/// Converts internal entities into their v1 wire form.
///
/// Payloads on the state feed are already wire messages and need no
/// translation.
pub trait Translator: Send + Sync {
    /// Reduce a received block to its slot and content hash.
    fn block_event(
        &self,
        block: &entities::SignedBeaconBlock,
    ) -> Result<wire::EventBlock, MigrationError>;

    fn unaggregated_attestation(
        &self,
        attestation: &entities::Attestation,
    ) -> Result<wire::Attestation, MigrationError>;

    fn aggregated_attestation(
        &self,
        aggregate: &entities::SignedAggregateAttestationAndProof,
    ) -> Result<wire::SignedAggregateAttestationAndProof, MigrationError>;

    fn voluntary_exit(
        &self,
        exit: &entities::SignedVoluntaryExit,
    ) -> Result<wire::SignedVoluntaryExit, MigrationError>;
}

/// Destination of a stream's envelopes.
///
/// A failed send ends the stream; implementations should not retry.
#[async_trait]
pub trait EventSink: Send {
    async fn send(&mut self, envelope: Envelope) -> Result<(), SinkError>;
}
