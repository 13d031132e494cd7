//! Channel-backed [`EventSink`].
//!
//! The HTTP layer hands the stream task the sending half; the response body
//! drains the receiving half. A dropped response shows up here as
//! [`SinkError::Disconnected`].

use crate::domain::{Envelope, SinkError};
use crate::ports::EventSink;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[async_trait]
impl EventSink for mpsc::Sender<Envelope> {
    async fn send(&mut self, envelope: Envelope) -> Result<(), SinkError> {
        mpsc::Sender::send(self, envelope)
            .await
            .map_err(|_| SinkError::Disconnected)
    }
}
