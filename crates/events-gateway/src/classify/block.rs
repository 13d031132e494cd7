//! Block feed classification.

use super::{Classified, Classifier};
use crate::domain::{EventMessage, Topic};
use shared_bus::{BlockEvent, BlockEventKind, BlockFeedEvent};

/// Topic a block feed kind is published under.
#[must_use]
pub fn block_topic(kind: BlockEventKind) -> Option<Topic> {
    match kind {
        BlockEventKind::ReceivedBlock => Some(Topic::Block),
    }
}

impl Classifier<'_> {
    /// Received blocks are reduced to their slot and content hash.
    pub fn classify_block(&self, event: BlockFeedEvent) -> Classified {
        let Some(event) = self.admit::<_, BlockEvent>(block_topic(event.kind), event) else {
            return Ok(None);
        };

        match event {
            BlockEvent::ReceivedBlock(data) => {
                let message = self.translator.block_event(&data.signed_block)?;
                Ok(Some(EventMessage::Block(message)))
            }
        }
    }
}
