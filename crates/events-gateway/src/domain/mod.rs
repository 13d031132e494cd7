//! Domain types for the events gateway.
//!
//! Topics, envelopes, configuration and error handling. Nothing here touches
//! a feed or a socket.

pub mod config;
pub mod envelope;
pub mod error;
pub mod topics;

// Re-exports for convenience
pub use config::{ConfigError, GatewayConfig, HttpConfig, StreamConfig};
pub use envelope::{Envelope, EventMessage};
pub use error::{CancelReason, ErrorCode, GatewayError, HandleError, SinkError, StreamError};
pub use topics::{validate_topics, Topic, TopicSet, UnknownTopic};
