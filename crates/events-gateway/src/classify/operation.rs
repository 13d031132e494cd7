//! Operation feed classification.

use super::{Classified, Classifier};
use crate::domain::{EventMessage, Topic};
use shared_bus::{OperationEvent, OperationEventKind, OperationFeedEvent};

/// Topic an operation feed kind is published under.
///
/// Aggregated and unaggregated attestations share the `attestation` topic.
/// Sync committee contributions have no topic.
#[must_use]
pub fn operation_topic(kind: OperationEventKind) -> Option<Topic> {
    match kind {
        OperationEventKind::UnaggregatedAttReceived | OperationEventKind::AggregatedAttReceived => {
            Some(Topic::Attestation)
        }
        OperationEventKind::ExitReceived => Some(Topic::VoluntaryExit),
        OperationEventKind::SyncCommitteeContributionReceived => None,
    }
}

impl Classifier<'_> {
    pub fn classify_operation(&self, event: OperationFeedEvent) -> Classified {
        let Some(event) = self.admit::<_, OperationEvent>(operation_topic(event.kind), event)
        else {
            return Ok(None);
        };

        let message = match event {
            OperationEvent::UnaggregatedAttReceived(data) => EventMessage::Attestation(
                self.translator.unaggregated_attestation(&data.attestation)?,
            ),
            OperationEvent::AggregatedAttReceived(data) => EventMessage::AggregatedAttestation(
                self.translator.aggregated_attestation(&data.attestation)?,
            ),
            OperationEvent::ExitReceived(data) => {
                EventMessage::VoluntaryExit(self.translator.voluntary_exit(&data.exit)?)
            }
            OperationEvent::SyncCommitteeContributionReceived(_) => return Ok(None),
        };
        Ok(Some(message))
    }
}
