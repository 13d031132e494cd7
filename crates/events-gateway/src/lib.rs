// Allow missing docs for internal items in development
#![allow(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Beacon events gateway - real-time event streams for a beacon node.
//!
//! Clients name the topics they care about and receive a filtered,
//! translated stream of the node's internal events.
//!
//! # Architecture
//!
//! ```text
//!   GET /eth/v1/events?topics=head,block
//!                 │
//!         ┌───────┴────────┐
//!         │ Topic Registry │  validate_topics()
//!         └───────┬────────┘
//!                 │
//!   ┌─────────────┴──────────────┐
//!   │     FeedSubscriptions      │  one depth-1 queue per feed
//!   └──┬──────────┬───────────┬──┘
//!      │ block    │ operation │ state
//!   ┌──┴──────────┴───────────┴──┐
//!   │     Multiplexing loop      │◄── caller cancel / service shutdown
//!   └─────────────┬──────────────┘
//!                 │ classify → translate
//!         ┌───────┴────────┐
//!         │ Envelope writer│  {event, data: AnyMessage}
//!         └───────┬────────┘
//!                 ▼
//!          server-sent events
//! ```
//!
//! # Topics
//!
//! | Topic | Feed | Kinds |
//! |-------|------|-------|
//! | `head` | state | new head |
//! | `block` | block | received block (slot and root only) |
//! | `attestation` | operation | unaggregated and aggregated attestations |
//! | `voluntary_exit` | operation | exits |
//! | `finalized_checkpoint` | state | finalized checkpoint |
//! | `chain_reorg` | state | reorg |
//!
//! # Usage
//!
//! ```ignore
//! use events_gateway::{EventsGatewayService, GatewayConfig};
//!
//! let service = EventsGatewayService::new(GatewayConfig::from_env()?, feeds)?;
//! service.start().await?;
//! ```

pub mod adapters;
pub mod classify;
pub mod domain;
pub mod ports;
pub mod service;
pub mod stream;

// Re-exports
pub use adapters::V1Translator;
pub use domain::{
    validate_topics, CancelReason, ConfigError, Envelope, ErrorCode, EventMessage, GatewayConfig,
    GatewayError, HandleError, SinkError, StreamError, Topic, TopicSet,
};
pub use ports::{EventSink, Translator};
pub use service::{EventsGatewayService, ShutdownHandle};
pub use stream::EventsServer;
