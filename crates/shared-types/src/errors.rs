//! # Error Types
//!
//! Errors raised while translating internal entities into wire messages.

use thiserror::Error;

/// Errors from the internal → v1 migration helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// Canonical encoding of an entity failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// A signature field does not have the length the wire type requires.
    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },
}

/// Errors from packing or unpacking an [`AnyMessage`](crate::wire::AnyMessage).
#[derive(Debug, Error)]
pub enum AnyMessageError {
    /// The container holds a different message type.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The message could not be converted to or from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
