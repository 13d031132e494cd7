//! # Shared Types Crate
//!
//! Beacon-chain types shared between the node's internal event feeds and the
//! events gateway.
//!
//! ## Design Principles
//!
//! - **Two representations**: [`entities`] are what the node produces
//!   internally; [`wire`] types are the stable v1 form clients receive.
//! - **One-way migration**: [`migration`] converts internal → v1. Nothing
//!   converts back.
//! - **Self-describing payloads**: every wire type is packed into an
//!   [`AnyMessage`] carrying its own type URL.

pub mod entities;
pub mod errors;
pub mod migration;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use wire::{AnyMessage, WireMessage};
