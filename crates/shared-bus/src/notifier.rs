//! # Notifiers
//!
//! Access points through which consumers reach the node's feeds. Each
//! producer side of the node owns one feed and exposes it through the
//! matching trait.

use crate::events::{BlockFeedEvent, OperationFeedEvent, StateFeedEvent};
use crate::feed::Feed;

/// Exposes the feed of received blocks.
pub trait BlockNotifier: Send + Sync {
    fn block_feed(&self) -> &Feed<BlockFeedEvent>;
}

/// Exposes the feed of gossiped operations (attestations, exits).
pub trait OperationNotifier: Send + Sync {
    fn operation_feed(&self) -> &Feed<OperationFeedEvent>;
}

/// Exposes the feed of chain-state transitions (head, finality, reorgs).
pub trait StateNotifier: Send + Sync {
    fn state_feed(&self) -> &Feed<StateFeedEvent>;
}

/// In-process implementation of all three notifiers.
///
/// Suitable for single-node operation and tests.
#[derive(Clone)]
pub struct NodeFeeds {
    block: Feed<BlockFeedEvent>,
    operation: Feed<OperationFeedEvent>,
    state: Feed<StateFeedEvent>,
}

impl NodeFeeds {
    #[must_use]
    pub fn new() -> Self {
        Self {
            block: Feed::new("block"),
            operation: Feed::new("operation"),
            state: Feed::new("state"),
        }
    }

    /// Total subscribers across the three feeds.
    #[must_use]
    pub fn total_subscribers(&self) -> usize {
        self.block.subscriber_count()
            + self.operation.subscriber_count()
            + self.state.subscriber_count()
    }

    /// Close every feed. Used on node shutdown.
    pub fn close_all(&self) {
        self.block.close();
        self.operation.close();
        self.state.close();
    }
}

impl Default for NodeFeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockNotifier for NodeFeeds {
    fn block_feed(&self) -> &Feed<BlockFeedEvent> {
        &self.block
    }
}

impl OperationNotifier for NodeFeeds {
    fn operation_feed(&self) -> &Feed<OperationFeedEvent> {
        &self.operation
    }
}

impl StateNotifier for NodeFeeds {
    fn state_feed(&self) -> &Feed<StateFeedEvent> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_feeds_are_named_by_source() {
        let feeds = NodeFeeds::new();
        assert_eq!(feeds.block_feed().name(), "block");
        assert_eq!(feeds.operation_feed().name(), "operation");
        assert_eq!(feeds.state_feed().name(), "state");
    }

    #[test]
    fn test_total_subscribers() {
        let feeds = NodeFeeds::new();
        let (tx, _rx) = mpsc::channel(1);
        let _a = feeds.state_feed().subscribe(tx).unwrap();
        let (tx, _rx2) = mpsc::channel(1);
        let _b = feeds.block_feed().subscribe(tx).unwrap();
        assert_eq!(feeds.total_subscribers(), 2);
    }

    #[test]
    fn test_clones_share_feeds() {
        let feeds = NodeFeeds::new();
        let clone = feeds.clone();
        let (tx, _rx) = mpsc::channel(1);
        let _sub = clone.operation_feed().subscribe(tx).unwrap();
        assert_eq!(feeds.operation_feed().subscriber_count(), 1);

        feeds.close_all();
        assert!(clone.state_feed().is_closed());
    }
}
