//! Events server: the per-call multiplexing loop.
//!
//! One call to [`EventsServer::stream_events`] serves one client. It runs on
//! the caller's task, opens its own feed subscriptions and waits on five
//! things at once: the three feed queues, the caller's cancellation token and
//! the service shutdown signal. A feed event is classified and written before
//! the loop waits again, so events from one feed reach the client in the
//! order they were published. Nothing orders events across feeds.

use super::subscriptions::FeedSubscriptions;
use super::writer::write_event;
use crate::adapters::V1Translator;
use crate::classify::{Classified, Classifier};
use crate::domain::{validate_topics, CancelReason, StreamError, TopicSet};
use crate::ports::{EventSink, Translator};
use node_telemetry::{
    time_histogram, EVENT_HANDLE_DURATION, EVENT_STREAMS_ACTIVE, EVENT_STREAM_TERMINATIONS,
};
use shared_bus::{BlockNotifier, EventSource, OperationNotifier, StateNotifier};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Serves event streams from the node's feeds.
///
/// Cheap to share behind an `Arc`; every stream borrows it immutably.
pub struct EventsServer {
    block_notifier: Arc<dyn BlockNotifier>,
    operation_notifier: Arc<dyn OperationNotifier>,
    state_notifier: Arc<dyn StateNotifier>,
    translator: Arc<dyn Translator>,
    shutdown: watch::Receiver<bool>,
    queue_depth: usize,
}

impl EventsServer {
    /// Serve from `feeds`, stopping every stream once `shutdown` turns true
    /// or its sender is dropped.
    pub fn new<N>(feeds: Arc<N>, shutdown: watch::Receiver<bool>) -> Self
    where
        N: BlockNotifier + OperationNotifier + StateNotifier + 'static,
    {
        Self {
            block_notifier: feeds.clone(),
            operation_notifier: feeds.clone(),
            state_notifier: feeds,
            translator: Arc::new(V1Translator),
            shutdown,
            queue_depth: 1,
        }
    }

    /// Replace the default v1 translation.
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Depth of each per-stream feed queue. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Validate `topics` and stream matching events into `sink`.
    ///
    /// Returns only when the stream ends: with [`StreamError::Canceled`] when
    /// either cancellation signal fires, otherwise with the error that ended
    /// it. An invalid request fails before any feed is subscribed.
    pub async fn stream_events<S, T>(
        &self,
        topics: &[T],
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        S: EventSink + ?Sized,
        T: AsRef<str> + Sync,
    {
        let requested = match validate_topics(topics) {
            Ok(requested) => requested,
            Err(e) => {
                record_termination(&e);
                return Err(e);
            }
        };
        self.stream_topics(requested, sink, cancel).await
    }

    /// Stream an already validated topic set.
    pub async fn stream_topics<S>(
        &self,
        requested: TopicSet,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        S: EventSink + ?Sized,
    {
        let span = info_span!("event_stream", stream_id = %Uuid::new_v4(), topics = %requested);

        async move {
            let result = match FeedSubscriptions::open(
                self.block_notifier.as_ref(),
                self.operation_notifier.as_ref(),
                self.state_notifier.as_ref(),
                self.queue_depth,
            ) {
                Ok(mut feeds) => {
                    let _active = ActiveStream::enter();
                    info!("Event stream opened");
                    self.run(&mut feeds, requested, sink, cancel).await
                }
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                record_termination(e);
                if e.is_canceled() {
                    info!(reason = %e, "Event stream closed");
                } else {
                    warn!(error = %e, "Event stream failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run<S>(
        &self,
        feeds: &mut FeedSubscriptions,
        requested: TopicSet,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        S: EventSink + ?Sized,
    {
        let classifier = Classifier::new(requested, self.translator.as_ref());
        let mut shutdown = self.shutdown.clone();

        loop {
            tokio::select! {
                event = feeds.blocks.recv() => {
                    let event = event.ok_or(StreamError::FeedClosed(EventSource::Block))?;
                    let _timer =
                        time_histogram!(EVENT_HANDLE_DURATION, &[EventSource::Block.as_str()]);
                    let classified = classifier.classify_block(event);
                    deliver(EventSource::Block, classified, sink).await?;
                }
                event = feeds.operations.recv() => {
                    let event = event.ok_or(StreamError::FeedClosed(EventSource::Operation))?;
                    let _timer =
                        time_histogram!(EVENT_HANDLE_DURATION, &[EventSource::Operation.as_str()]);
                    let classified = classifier.classify_operation(event);
                    deliver(EventSource::Operation, classified, sink).await?;
                }
                event = feeds.states.recv() => {
                    let event = event.ok_or(StreamError::FeedClosed(EventSource::State))?;
                    let _timer =
                        time_histogram!(EVENT_HANDLE_DURATION, &[EventSource::State.as_str()]);
                    let classified = classifier.classify_state(event);
                    deliver(EventSource::State, classified, sink).await?;
                }
                () = cancel.cancelled() => {
                    return Err(StreamError::Canceled(CancelReason::Caller));
                }
                () = shutdown_requested(&mut shutdown) => {
                    return Err(StreamError::Canceled(CancelReason::Service));
                }
            }
        }
    }
}

/// Write a classified event, attaching the feed to any failure.
async fn deliver<S>(
    source: EventSource,
    classified: Classified,
    sink: &mut S,
) -> Result<(), StreamError>
where
    S: EventSink + ?Sized,
{
    let result = match classified {
        Ok(Some(message)) => write_event(sink, &message).await,
        Ok(None) => {
            debug!(feed = %source, "Event not streamed");
            Ok(())
        }
        Err(e) => Err(e),
    };
    result.map_err(|e| StreamError::handle(source, e))
}

/// Resolves once shutdown is signalled or the signal's sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

fn record_termination(error: &StreamError) {
    EVENT_STREAM_TERMINATIONS
        .with_label_values(&[error.code().as_str()])
        .inc();
}

/// Holds the active-stream gauge up for its lifetime.
struct ActiveStream;

impl ActiveStream {
    fn enter() -> Self {
        EVENT_STREAMS_ACTIVE.inc();
        Self
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        EVENT_STREAMS_ACTIVE.dec();
    }
}
