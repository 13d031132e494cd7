//! Scoped feed subscriptions.
//!
//! [`FeedSubscriptions`] opens one bounded queue on each node feed and holds
//! the three registrations for as long as it lives. Every registration is
//! removed when it is dropped, whichever way the stream ends.

use crate::domain::StreamError;
use shared_bus::{
    BlockFeedEvent, BlockNotifier, OperationFeedEvent, OperationNotifier, StateFeedEvent,
    StateNotifier, Subscription,
};
use tokio::sync::mpsc;
use tracing::debug;

/// The three feed queues of one event stream.
pub struct FeedSubscriptions {
    pub(crate) blocks: mpsc::Receiver<BlockFeedEvent>,
    pub(crate) operations: mpsc::Receiver<OperationFeedEvent>,
    pub(crate) states: mpsc::Receiver<StateFeedEvent>,
    registrations: Option<Registrations>,
}

struct Registrations {
    block: Subscription<BlockFeedEvent>,
    operation: Subscription<OperationFeedEvent>,
    state: Subscription<StateFeedEvent>,
}

impl FeedSubscriptions {
    /// Subscribe to all three feeds with queues of `depth`.
    ///
    /// If any feed refuses, registrations already made are released before
    /// the error is returned.
    pub fn open(
        block: &dyn BlockNotifier,
        operation: &dyn OperationNotifier,
        state: &dyn StateNotifier,
        depth: usize,
    ) -> Result<Self, StreamError> {
        let (block_tx, blocks) = mpsc::channel(depth);
        let (operation_tx, operations) = mpsc::channel(depth);
        let (state_tx, states) = mpsc::channel(depth);

        let block = block.block_feed().subscribe(block_tx)?;
        let operation = operation.operation_feed().subscribe(operation_tx)?;
        let state = state.state_feed().subscribe(state_tx)?;

        debug!(
            block = block.id(),
            operation = operation.id(),
            state = state.id(),
            depth,
            "Opened feed subscriptions"
        );

        Ok(Self {
            blocks,
            operations,
            states,
            registrations: Some(Registrations {
                block,
                operation,
                state,
            }),
        })
    }

    /// Remove all three registrations. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(mut registrations) = self.registrations.take() {
            registrations.block.unsubscribe();
            registrations.operation.unsubscribe();
            registrations.state.unsubscribe();
            debug!("Released feed subscriptions");
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registrations.is_some()
    }
}

impl Drop for FeedSubscriptions {
    fn drop(&mut self) {
        self.release();
    }
}
