//! Stream envelopes.
//!
//! An [`EventMessage`] is a translated wire message whose topic follows from
//! its variant. An [`Envelope`] is what actually goes out: the topic name and
//! the message packed into a self-describing [`AnyMessage`].

use super::topics::Topic;
use serde::Serialize;
use shared_types::wire::{
    Attestation, EventBlock, EventChainReorg, EventFinalizedCheckpoint, EventHead,
    SignedAggregateAttestationAndProof, SignedVoluntaryExit,
};
use shared_types::{AnyMessage, AnyMessageError};

/// A translated message ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventMessage {
    Head(EventHead),
    Block(EventBlock),
    Attestation(Attestation),
    AggregatedAttestation(SignedAggregateAttestationAndProof),
    VoluntaryExit(SignedVoluntaryExit),
    FinalizedCheckpoint(EventFinalizedCheckpoint),
    ChainReorg(EventChainReorg),
}

impl EventMessage {
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::Head(_) => Topic::Head,
            Self::Block(_) => Topic::Block,
            Self::Attestation(_) | Self::AggregatedAttestation(_) => Topic::Attestation,
            Self::VoluntaryExit(_) => Topic::VoluntaryExit,
            Self::FinalizedCheckpoint(_) => Topic::FinalizedCheckpoint,
            Self::ChainReorg(_) => Topic::ChainReorg,
        }
    }

    /// Pack into the self-describing container.
    pub fn pack(&self) -> Result<AnyMessage, AnyMessageError> {
        match self {
            Self::Head(m) => AnyMessage::pack(m),
            Self::Block(m) => AnyMessage::pack(m),
            Self::Attestation(m) => AnyMessage::pack(m),
            Self::AggregatedAttestation(m) => AnyMessage::pack(m),
            Self::VoluntaryExit(m) => AnyMessage::pack(m),
            Self::FinalizedCheckpoint(m) => AnyMessage::pack(m),
            Self::ChainReorg(m) => AnyMessage::pack(m),
        }
    }
}

/// One item of an event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub event: Topic,
    pub data: AnyMessage,
}

impl Envelope {
    pub fn new(message: &EventMessage) -> Result<Self, AnyMessageError> {
        Ok(Self {
            event: message.topic(),
            data: message.pack()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Root;

    #[test]
    fn test_head_envelope() {
        let head = EventHead {
            slot: 10,
            block: Root::repeat(0xaa),
            ..Default::default()
        };
        let envelope = Envelope::new(&EventMessage::Head(head.clone())).unwrap();

        assert_eq!(envelope.event, Topic::Head);
        assert!(envelope.data.is::<EventHead>());
        assert_eq!(envelope.data.unpack::<EventHead>().unwrap(), head);
    }

    #[test]
    fn test_aggregate_uses_attestation_topic() {
        let message = EventMessage::AggregatedAttestation(Default::default());
        assert_eq!(message.topic(), Topic::Attestation);

        let envelope = Envelope::new(&message).unwrap();
        assert!(envelope
            .data
            .type_url
            .ends_with("SignedAggregateAttestationAndProof"));
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = Envelope::new(&EventMessage::Block(EventBlock {
            slot: 5,
            block: Root::repeat(0xbb),
        }))
        .unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["event"], "block");
        assert_eq!(
            json["data"]["@type"],
            "type.googleapis.com/ethereum.eth.v1.EventBlock"
        );
        assert_eq!(json["data"]["value"]["slot"], 5);
    }
}
