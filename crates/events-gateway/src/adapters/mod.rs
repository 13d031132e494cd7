//! Adapters for the events gateway.
//!
//! Default implementations of the outbound ports.

pub mod sink;
pub mod translator;

pub use translator::V1Translator;
