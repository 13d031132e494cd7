//! Ports for the events gateway.

pub mod outbound;

pub use outbound::{EventSink, Translator};
