//! Error types for event streams and the gateway service.
//!
//! A stream ends in one of three ways, reported by [`ErrorCode`]:
//! the request was invalid, something inside the node failed, or one of the
//! two cancellation signals fired. Cancellation is a normal termination.

use shared_bus::{EventSource, FeedError};
use shared_types::{AnyMessageError, MigrationError};
use std::fmt;
use thiserror::Error;

/// Status class of a stream termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    Internal,
    Canceled,
}

impl ErrorCode {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Internal => "internal",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side ended the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The client went away or its deadline passed.
    Caller,
    /// The gateway is shutting down.
    Service,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caller => f.write_str("caller"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// Failure to write an envelope to the outbound stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The receiving end is gone.
    #[error("stream receiver disconnected")]
    Disconnected,

    /// The transport rejected the write.
    #[error("write failed: {0}")]
    Write(String),
}

/// Failure while handling one feed event.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("could not translate payload: {0}")]
    Translate(#[from] MigrationError),

    #[error("could not encode message: {0}")]
    Encode(#[from] AnyMessageError),

    #[error("could not send over stream: {0}")]
    Send(#[from] SinkError),
}

/// Terminal result of an event stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Rejected before any subscription was opened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A feed refused the subscription.
    #[error("could not subscribe to node events: {0}")]
    Subscribe(#[from] FeedError),

    /// An event matched a requested topic but could not be delivered.
    #[error("could not handle {source_feed} event: {error}")]
    Handle {
        source_feed: EventSource,
        #[source]
        error: HandleError,
    },

    /// A feed stopped publishing while the stream was open.
    #[error("{0} feed closed")]
    FeedClosed(EventSource),

    #[error("context canceled by {0}")]
    Canceled(CancelReason),
}

impl StreamError {
    pub(crate) fn handle(source_feed: EventSource, error: HandleError) -> Self {
        Self::Handle { source_feed, error }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Subscribe(_) | Self::Handle { .. } | Self::FeedClosed(_) => ErrorCode::Internal,
            Self::Canceled(_) => ErrorCode::Canceled,
        }
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.code() == ErrorCode::Canceled
    }
}

/// Gateway service errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// The HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
