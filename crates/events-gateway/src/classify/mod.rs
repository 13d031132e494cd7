//! Event classifiers.
//!
//! One classifier per node feed. For each raw event a classifier decides, in
//! order:
//!
//! 1. whether the kind maps to a topic at all,
//! 2. whether that topic was requested,
//! 3. whether the payload matches the kind,
//!
//! and only then translates the payload into an [`EventMessage`]. An event
//! failing any of the three checks yields `Ok(None)`. A translation failure is
//! an error and ends the stream.

mod block;
mod operation;
mod state;

pub use block::block_topic;
pub use operation::operation_topic;
pub use state::state_topic;

use crate::domain::{EventMessage, HandleError, Topic, TopicSet};
use crate::ports::Translator;
use node_telemetry::EVENTS_DROPPED_MALFORMED;
use shared_bus::PayloadMismatch;
use tracing::debug;

/// Outcome of classifying one event.
pub type Classified = Result<Option<EventMessage>, HandleError>;

/// Classifies events for one stream.
pub struct Classifier<'a> {
    requested: TopicSet,
    translator: &'a dyn Translator,
}

impl<'a> Classifier<'a> {
    pub fn new(requested: TopicSet, translator: &'a dyn Translator) -> Self {
        Self {
            requested,
            translator,
        }
    }

    /// Apply the topic and payload checks, returning the typed event if it
    /// should be translated.
    fn admit<E, R>(&self, topic: Option<Topic>, event: E) -> Option<R>
    where
        R: TryFrom<E, Error = PayloadMismatch>,
    {
        let topic = topic?;
        if !self.requested.contains(topic) {
            return None;
        }
        match R::try_from(event) {
            Ok(typed) => Some(typed),
            Err(mismatch) => {
                record_malformed(&mismatch);
                None
            }
        }
    }
}

fn record_malformed(mismatch: &PayloadMismatch) {
    EVENTS_DROPPED_MALFORMED
        .with_label_values(&[mismatch.feed.as_str(), &mismatch.kind])
        .inc();
    debug!(
        feed = %mismatch.feed,
        kind = %mismatch.kind,
        payload = mismatch.payload,
        "Dropped event with mismatched payload"
    );
}
