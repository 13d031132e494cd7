//! Envelope writer.

use crate::domain::{Envelope, EventMessage, HandleError};
use crate::ports::EventSink;
use node_telemetry::EVENTS_STREAMED;
use tracing::trace;

/// Pack `message`, tag it with its topic and write it to `sink`.
///
/// Nothing is buffered: the call returns once the sink has accepted the
/// envelope or failed.
pub async fn write_event<S>(sink: &mut S, message: &EventMessage) -> Result<(), HandleError>
where
    S: EventSink + ?Sized,
{
    let envelope = Envelope::new(message)?;
    let topic = envelope.event;
    sink.send(envelope).await?;

    EVENTS_STREAMED.with_label_values(&[topic.as_str()]).inc();
    trace!(%topic, "Wrote event envelope");
    Ok(())
}
