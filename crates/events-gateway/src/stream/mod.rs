//! Event stream machinery: per-call feed subscriptions, the multiplexing
//! loop, and the envelope writer.

pub mod server;
pub mod subscriptions;
pub mod writer;

pub use server::EventsServer;
pub use subscriptions::FeedSubscriptions;
pub use writer::write_event;
