//! # Node Telemetry
//!
//! Logging and metrics for the beacon events gateway.
//!
//! ## Components
//!
//! - **Logs**: `tracing` + `tracing-subscriber`, pretty or JSON
//! - **Metrics**: Prometheus counters, gauges and histograms in a private
//!   registry, exposed as text by the gateway's `/metrics` route
//!
//! ## Usage
//!
//! ```rust,ignore
//! use node_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EVENTS_SERVICE_NAME` | `beacon-events` | Service name in startup logs |
//! | `EVENTS_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `EVENTS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `EVENTS_JSON_LOGS` | `false` | JSON log lines (default `true` in containers) |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, EVENTS_DROPPED_MALFORMED, EVENTS_STREAMED,
    EVENT_HANDLE_DURATION, EVENT_STREAMS_ACTIVE, EVENT_STREAM_TERMINATIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize metrics and logging.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active. Logs on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
