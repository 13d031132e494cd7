//! Events gateway service - HTTP entry point.
//!
//! Serves `GET /eth/v1/events` as server-sent events, plus `/health` and
//! `/metrics`.

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ErrorCode, GatewayError, StreamError};
use crate::domain::{validate_topics, Envelope};
use crate::stream::EventsServer;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use shared_bus::{BlockNotifier, OperationNotifier, StateNotifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Events gateway service state
pub struct EventsGatewayService {
    config: GatewayConfig,
    server: Arc<EventsServer>,
    shutdown: ShutdownHandle,
}

/// Flips the service-wide shutdown signal. Cloneable.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Stop the HTTP server and end every open stream with *canceled*.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Clone)]
struct AppState {
    server: Arc<EventsServer>,
    keep_alive: Duration,
}

impl EventsGatewayService {
    /// Create a new events gateway service over the node's feeds.
    pub fn new<N>(config: GatewayConfig, feeds: Arc<N>) -> Result<Self, GatewayError>
    where
        N: BlockNotifier + OperationNotifier + StateNotifier + 'static,
    {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let (tx, rx) = watch::channel(false);
        let server = Arc::new(
            EventsServer::new(feeds, rx).with_queue_depth(config.stream.feed_queue_depth),
        );

        Ok(Self {
            config,
            server,
            shutdown: ShutdownHandle { tx: Arc::new(tx) },
        })
    }

    /// Handle for stopping the service from another task.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// The stream server behind the HTTP routes.
    #[must_use]
    pub fn events_server(&self) -> Arc<EventsServer> {
        Arc::clone(&self.server)
    }

    /// Bind and serve until [`shutdown`](Self::shutdown) is called.
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        info!(addr = %addr, "Starting events gateway");

        let mut stop = self.shutdown.tx.subscribe();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = stop.wait_for(|stop| *stop).await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server error");
                GatewayError::Serve(e.to_string())
            })?;

        info!("Events gateway stopped");
        Ok(())
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            server: Arc::clone(&self.server),
            keep_alive: self.config.stream.keep_alive,
        };

        Router::new()
            .route("/eth/v1/events", get(stream_events))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics))
            .with_state(state)
    }
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    /// Comma-separated topic names
    topics: Option<String>,
}

/// Split the `topics` query value. Empty segments are skipped.
fn parse_topics(raw: Option<&str>) -> Vec<&str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let requested = match validate_topics(&parse_topics(query.topics.as_deref())) {
        Ok(requested) => requested,
        Err(e) => return error_response(&e),
    };

    let (mut tx, rx) = mpsc::channel::<Envelope>(1);
    let cancel = CancellationToken::new();
    // Dropping the response body cancels the stream task.
    let guard = cancel.clone().drop_guard();

    let server = Arc::clone(&state.server);
    tokio::spawn(async move {
        let _ = server.stream_topics(requested, &mut tx, cancel).await;
    });

    let events = ReceiverStream::new(rx).map(move |envelope| {
        let _held = &guard;
        Event::default()
            .event(envelope.event.as_str())
            .json_data(&envelope.data)
    });

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(state.keep_alive))
        .into_response()
}

fn error_response(error: &StreamError) -> Response {
    let status = match error.code() {
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Canceled => StatusCode::SERVICE_UNAVAILABLE,
    };
    let body = Json(serde_json::json!({
        "code": status.as_u16(),
        "message": error.to_string(),
    }));
    (status, body).into_response()
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "events-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics() -> Response {
    match node_telemetry::encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
