//! State feed classification.
//!
//! State payloads are already v1 messages; nothing is translated.

use super::{Classified, Classifier};
use crate::domain::{EventMessage, Topic};
use shared_bus::{StateEvent, StateEventKind, StateFeedEvent};

/// Topic a state feed kind is published under.
#[must_use]
pub fn state_topic(kind: StateEventKind) -> Option<Topic> {
    match kind {
        StateEventKind::NewHead => Some(Topic::Head),
        StateEventKind::FinalizedCheckpoint => Some(Topic::FinalizedCheckpoint),
        StateEventKind::Reorg => Some(Topic::ChainReorg),
        StateEventKind::BlockProcessed
        | StateEventKind::ChainStarted
        | StateEventKind::Initialized
        | StateEventKind::Synced => None,
    }
}

impl Classifier<'_> {
    pub fn classify_state(&self, event: StateFeedEvent) -> Classified {
        let Some(event) = self.admit::<_, StateEvent>(state_topic(event.kind), event) else {
            return Ok(None);
        };

        Ok(match event {
            StateEvent::NewHead(head) => Some(EventMessage::Head(head)),
            StateEvent::FinalizedCheckpoint(checkpoint) => {
                Some(EventMessage::FinalizedCheckpoint(checkpoint))
            }
            StateEvent::Reorg(reorg) => Some(EventMessage::ChainReorg(reorg)),
            StateEvent::BlockProcessed(_)
            | StateEvent::ChainStarted(_)
            | StateEvent::Initialized(_)
            | StateEvent::Synced(_) => None,
        })
    }
}
