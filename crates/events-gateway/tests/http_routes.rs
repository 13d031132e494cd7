//! HTTP surface tests, driven through the router without binding a socket.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use events_gateway::{EventsGatewayService, GatewayConfig};
use futures::StreamExt;
use shared_bus::{EventPayload, NodeFeeds, StateEventKind, StateFeedEvent, StateNotifier};
use shared_types::wire::EventHead;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tower::ServiceExt;

const WAIT: Duration = Duration::from_secs(2);

fn service() -> (EventsGatewayService, Arc<NodeFeeds>) {
    let feeds = Arc::new(NodeFeeds::new());
    let service = EventsGatewayService::new(GatewayConfig::default(), Arc::clone(&feeds)).unwrap();
    (service, feeds)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_for_subscribers(feeds: &NodeFeeds, expected: usize) {
    timeout(WAIT, async {
        while feeds.total_subscribers() != expected {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscriber count never reached expected value");
}

#[tokio::test]
async fn test_health() {
    let (service, _) = service();
    let response = service.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response.into_body()).await["status"], "ok");
}

#[tokio::test]
async fn test_missing_topics_is_bad_request() {
    let (service, feeds) = service();
    let response = service.router().oneshot(get("/eth/v1/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["code"], 400);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("no topics specified to subscribe to"));
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_unknown_topic_is_bad_request() {
    let (service, feeds) = service();
    let response = service
        .router()
        .oneshot(get("/eth/v1/events?topics=head,blocks"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().contains("topic blocks not allowed"));
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_metrics_exposition() {
    node_telemetry::register_metrics().unwrap();
    let (service, _) = service();
    let response = service.router().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_event_stream_delivers_and_releases_on_disconnect() {
    let (service, feeds) = service();
    let response = service
        .router()
        .oneshot(get("/eth/v1/events?topics=head"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    wait_for_subscribers(&feeds, 3).await;

    let head = EventHead {
        slot: 42,
        ..Default::default()
    };
    feeds
        .state_feed()
        .send(StateFeedEvent::new(StateEventKind::NewHead, EventPayload::Head(head)))
        .await;

    let mut body = response.into_body().into_data_stream();
    let mut text = String::new();
    timeout(WAIT, async {
        while !text.contains("\n\n") {
            let chunk = body.next().await.expect("body ended").unwrap();
            text.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("no event within timeout");

    assert!(text.contains("event: head"));
    assert!(text.contains("\"slot\":42"));
    assert!(text.contains("ethereum.eth.v1.EventHead"));

    // Client goes away: the stream must give back its subscriptions.
    drop(body);
    wait_for_subscribers(&feeds, 0).await;
}

#[tokio::test]
async fn test_shutdown_ends_open_streams() {
    let (service, feeds) = service();
    let response = service
        .router()
        .oneshot(get("/eth/v1/events?topics=head,block"))
        .await
        .unwrap();
    wait_for_subscribers(&feeds, 3).await;

    service.shutdown();
    wait_for_subscribers(&feeds, 0).await;
    drop(response);
}
