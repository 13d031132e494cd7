//! Prometheus metrics for the events gateway.
//!
//! All metrics follow the naming convention: `beacon_events_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., events_streamed_total)
//! - **Gauge**: Value that can go up or down (e.g., streams_active)
//! - **Histogram**: Distribution of values (e.g., event_handle_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec,
    IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Envelopes written to clients, by topic
    pub static ref EVENTS_STREAMED: IntCounterVec = IntCounterVec::new(
        Opts::new("beacon_events_streamed_total", "Envelopes written to event stream clients"),
        &["topic"]
    ).expect("metric creation failed");

    /// Events dropped because their payload did not match their kind
    pub static ref EVENTS_DROPPED_MALFORMED: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "beacon_events_dropped_malformed_total",
            "Feed events dropped because the payload did not match the event kind"
        ),
        &["feed", "kind"]
    ).expect("metric creation failed");

    /// Event streams currently open
    pub static ref EVENT_STREAMS_ACTIVE: IntGauge = IntGauge::new(
        "beacon_events_streams_active",
        "Number of open event streams"
    ).expect("metric creation failed");

    /// Event stream terminations by reason
    pub static ref EVENT_STREAM_TERMINATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("beacon_events_stream_terminations_total", "Event streams ended, by reason"),
        &["reason"]  // reason: canceled/internal/invalid_argument
    ).expect("metric creation failed");

    /// Time spent classifying, translating and writing one feed event
    pub static ref EVENT_HANDLE_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "beacon_events_handle_duration_seconds",
            "Time spent handling a single feed event"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid buckets")),
        &["feed"]
    ).expect("metric creation failed");
}

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

/// Register all metrics with the global registry.
///
/// Safe to call more than once; only the first call registers and every
/// call reports its outcome.
pub fn register_metrics() -> Result<(), TelemetryError> {
    register_once(&REGISTERED, &REGISTRY)
}

fn register_once(
    cell: &OnceLock<Result<(), String>>,
    registry: &Registry,
) -> Result<(), TelemetryError> {
    cell.get_or_init(|| register_all(registry))
        .clone()
        .map_err(TelemetryError::MetricsInit)
}

fn register_all(registry: &Registry) -> Result<(), String> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(EVENTS_STREAMED.clone()),
        Box::new(EVENTS_DROPPED_MALFORMED.clone()),
        Box::new(EVENT_STREAMS_ACTIVE.clone()),
        Box::new(EVENT_STREAM_TERMINATIONS.clone()),
        Box::new(EVENT_HANDLE_DURATION.clone()),
    ];

    for metric in metrics {
        registry.register(metric).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    register_metrics()?;

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing a labelled histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr, $labels:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram.with_label_values($labels))
    };
}
