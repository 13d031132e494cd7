//! Beacon events gateway binary.
//!
//! Serves the event stream over in-process node feeds until Ctrl-C.

use anyhow::Context;
use events_gateway::{EventsGatewayService, GatewayConfig};
use node_telemetry::{init_telemetry, TelemetryConfig};
use shared_bus::NodeFeeds;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry =
        init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let feeds = Arc::new(NodeFeeds::new());
    let service = EventsGatewayService::new(config, Arc::clone(&feeds))?;

    let shutdown = service.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        shutdown.trigger();
    });

    service.start().await?;
    feeds.close_all();
    Ok(())
}
