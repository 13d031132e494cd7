//! # Shared Bus - Internal Event Feeds
//!
//! The node publishes what happens inside it on three independent feeds:
//!
//! | feed | events |
//! |------|--------|
//! | block | blocks received from the network |
//! | operation | attestations, aggregates, voluntary exits, sync contributions |
//! | state | new head, block processed, chain start/sync, reorgs, finality |
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐    send()     ┌──────────────┐   bounded mpsc   ┌────────────┐
//! │  Producer    │ ────────────→ │   Feed<T>    │ ───────────────→ │ Subscriber │
//! └──────────────┘               └──────────────┘   (one per sub)  └────────────┘
//! ```
//!
//! Subscribers own their queues; producers wait for room. There is no
//! ordering between feeds, only within one.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod feed;
pub mod notifier;

pub use events::{
    BlockEvent, BlockEventKind, BlockFeedEvent, EventPayload, EventSource, FeedEvent,
    OperationEvent, OperationEventKind, OperationFeedEvent, PayloadMismatch, StateEvent,
    StateEventKind, StateFeedEvent,
};
pub use feed::{Feed, FeedError, Subscription};
pub use notifier::{BlockNotifier, NodeFeeds, OperationNotifier, StateNotifier};
