//! End-to-end tests for the event stream: node feeds in, envelopes out.

use async_trait::async_trait;
use events_gateway::{
    CancelReason, Envelope, ErrorCode, EventSink, EventsServer, HandleError, SinkError,
    StreamError, Topic, Translator,
};
use shared_bus::events::{
    ExitReceivedData, ReceivedBlockData, SyncedData, UnaggregatedAttReceivedData,
};
use shared_bus::{
    BlockEventKind, BlockFeedEvent, BlockNotifier, EventPayload, NodeFeeds, OperationEventKind,
    OperationFeedEvent, OperationNotifier, StateEventKind, StateFeedEvent, StateNotifier,
};
use shared_types::entities::{self, BeaconBlockBody, SignedBeaconBlock, SignedBlock};
use shared_types::wire::{self, EventBlock, EventHead, SIGNATURE_LENGTH};
use shared_types::{migration, MigrationError, Root};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(2);

// =============================================================================
// HARNESS
// =============================================================================

struct Harness {
    feeds: Arc<NodeFeeds>,
    shutdown: watch::Sender<bool>,
    cancel: CancellationToken,
    envelopes: mpsc::Receiver<Envelope>,
    task: JoinHandle<Result<(), StreamError>>,
}

impl Harness {
    async fn start(topics: &[&str]) -> Self {
        Self::start_with(topics, None).await
    }

    async fn start_with(topics: &[&str], translator: Option<Arc<dyn Translator>>) -> Self {
        let feeds = Arc::new(NodeFeeds::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let mut server = EventsServer::new(Arc::clone(&feeds), shutdown_rx);
        if let Some(translator) = translator {
            server = server.with_translator(translator);
        }

        let (mut tx, envelopes) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let topics: Vec<String> = topics.iter().map(|t| t.to_string()).collect();
        let token = cancel.clone();
        let task = tokio::spawn(async move { server.stream_events(&topics, &mut tx, token).await });

        let harness = Self {
            feeds,
            shutdown,
            cancel,
            envelopes,
            task,
        };
        harness.wait_for_subscribers(3).await;
        harness
    }

    async fn wait_for_subscribers(&self, expected: usize) {
        timeout(WAIT, async {
            while self.feeds.total_subscribers() != expected {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("subscriber count never reached expected value");
    }

    async fn next(&mut self) -> Envelope {
        timeout(WAIT, self.envelopes.recv())
            .await
            .expect("no envelope within timeout")
            .expect("stream ended")
    }

    async fn finish(self) -> (Result<(), StreamError>, Arc<NodeFeeds>) {
        let result = timeout(WAIT, self.task)
            .await
            .expect("stream did not end")
            .expect("stream task panicked");
        (result, self.feeds)
    }
}

fn head(slot: u64, block: u8) -> StateFeedEvent {
    StateFeedEvent::new(
        StateEventKind::NewHead,
        EventPayload::Head(EventHead {
            slot,
            block: Root::repeat(block),
            ..Default::default()
        }),
    )
}

fn signed_block(slot: u64, signature_len: usize) -> SignedBeaconBlock {
    let mut inner = SignedBlock::<BeaconBlockBody>::default();
    inner.block.slot = slot;
    inner.block.proposer_index = 3;
    inner.signature = vec![0x11; signature_len];
    SignedBeaconBlock::Phase0(inner)
}

fn received_block(block: SignedBeaconBlock) -> BlockFeedEvent {
    BlockFeedEvent::new(
        BlockEventKind::ReceivedBlock,
        EventPayload::ReceivedBlock(ReceivedBlockData {
            signed_block: block,
        }),
    )
}

fn exit_received(validator_index: u64) -> OperationFeedEvent {
    let mut exit = entities::SignedVoluntaryExit::default();
    exit.exit.validator_index = validator_index;
    OperationFeedEvent::new(
        OperationEventKind::ExitReceived,
        EventPayload::Exit(ExitReceivedData { exit }),
    )
}

fn attestation_received(slot: u64) -> OperationFeedEvent {
    let mut attestation = entities::Attestation::default();
    attestation.data.slot = slot;
    OperationFeedEvent::new(
        OperationEventKind::UnaggregatedAttReceived,
        EventPayload::UnaggregatedAtt(UnaggregatedAttReceivedData { attestation }),
    )
}

/// Translator that reports a fixed block root.
struct FixedRootTranslator(Root);

impl Translator for FixedRootTranslator {
    fn block_event(&self, block: &SignedBeaconBlock) -> Result<EventBlock, MigrationError> {
        Ok(EventBlock {
            slot: block.slot(),
            block: self.0,
        })
    }

    fn unaggregated_attestation(
        &self,
        attestation: &entities::Attestation,
    ) -> Result<wire::Attestation, MigrationError> {
        Ok(migration::attestation_to_v1(attestation))
    }

    fn aggregated_attestation(
        &self,
        aggregate: &entities::SignedAggregateAttestationAndProof,
    ) -> Result<wire::SignedAggregateAttestationAndProof, MigrationError> {
        Ok(migration::aggregate_att_and_proof_to_v1(aggregate))
    }

    fn voluntary_exit(
        &self,
        exit: &entities::SignedVoluntaryExit,
    ) -> Result<wire::SignedVoluntaryExit, MigrationError> {
        Ok(migration::exit_to_v1(exit))
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_new_head_streams_one_envelope() {
    let mut harness = Harness::start(&["head"]).await;

    assert_eq!(harness.feeds.state_feed().send(head(10, 0xaa)).await, 1);

    let envelope = harness.next().await;
    assert_eq!(envelope.event, Topic::Head);
    let message: EventHead = envelope.data.unpack().unwrap();
    assert_eq!(message.slot, 10);
    assert_eq!(message.block, Root::repeat(0xaa));

    harness.cancel.cancel();
    let (result, _) = harness.finish().await;
    assert!(result.unwrap_err().is_canceled());
}

#[tokio::test]
async fn test_received_block_reduced_to_slot_and_root() {
    let translator: Arc<dyn Translator> = Arc::new(FixedRootTranslator(Root::repeat(0xbb)));
    let mut harness = Harness::start_with(&["block"], Some(translator)).await;

    harness
        .feeds
        .block_feed()
        .send(received_block(signed_block(5, SIGNATURE_LENGTH)))
        .await;

    let envelope = harness.next().await;
    assert_eq!(envelope.event, Topic::Block);
    assert_eq!(
        envelope.data.unpack::<EventBlock>().unwrap(),
        EventBlock {
            slot: 5,
            block: Root::repeat(0xbb),
        }
    );
}

#[tokio::test]
async fn test_block_root_is_header_content_hash() {
    let mut harness = Harness::start(&["block"]).await;
    let block = signed_block(5, SIGNATURE_LENGTH);
    let expected = migration::block_to_v1_header(&block)
        .unwrap()
        .block_root()
        .unwrap();

    harness.feeds.block_feed().send(received_block(block)).await;

    let message: EventBlock = harness.next().await.data.unpack().unwrap();
    assert_eq!(message.slot, 5);
    assert_eq!(message.block, expected);
}

#[tokio::test]
async fn test_unrequested_exit_produces_nothing() {
    let mut harness = Harness::start(&["attestation"]).await;
    let operations = harness.feeds.operation_feed().clone();

    operations.send(exit_received(4)).await;
    operations.send(attestation_received(77)).await;

    // The exit was skipped: the first envelope is the attestation.
    let envelope = harness.next().await;
    assert_eq!(envelope.event, Topic::Attestation);
    assert_eq!(envelope.data.unpack::<wire::Attestation>().unwrap().data.slot, 77);
}

#[tokio::test]
async fn test_caller_cancel_ends_stream_and_releases_feeds() {
    let harness = Harness::start(&["head", "block"]).await;

    harness.cancel.cancel();
    let feeds = Arc::clone(&harness.feeds);
    let (result, _) = harness.finish().await;

    assert!(matches!(
        result,
        Err(StreamError::Canceled(CancelReason::Caller))
    ));
    assert_eq!(feeds.total_subscribers(), 0);
    assert_eq!(feeds.state_feed().send(head(11, 0x01)).await, 0);
}

// =============================================================================
// ORDERING AND FILTERING
// =============================================================================

#[tokio::test]
async fn test_per_feed_order_preserved() {
    let mut harness = Harness::start(&["head"]).await;
    let states = harness.feeds.state_feed().clone();

    let publisher = tokio::spawn(async move {
        for slot in 1..=5 {
            states.send(head(slot, slot as u8)).await;
        }
    });

    for slot in 1..=5 {
        let message: EventHead = harness.next().await.data.unpack().unwrap();
        assert_eq!(message.slot, slot);
    }
    publisher.await.unwrap();
}

#[tokio::test]
async fn test_events_from_every_feed_arrive() {
    let mut harness =
        Harness::start(&["head", "block", "voluntary_exit", "finalized_checkpoint"]).await;

    harness.feeds.state_feed().send(head(1, 0x01)).await;
    assert_eq!(harness.next().await.event, Topic::Head);

    harness
        .feeds
        .block_feed()
        .send(received_block(signed_block(2, SIGNATURE_LENGTH)))
        .await;
    assert_eq!(harness.next().await.event, Topic::Block);

    harness.feeds.operation_feed().send(exit_received(9)).await;
    let envelope = harness.next().await;
    assert_eq!(envelope.event, Topic::VoluntaryExit);
    let exit: wire::SignedVoluntaryExit = envelope.data.unpack().unwrap();
    assert_eq!(exit.message.validator_index, 9);

    harness
        .feeds
        .state_feed()
        .send(StateFeedEvent::new(
            StateEventKind::FinalizedCheckpoint,
            EventPayload::FinalizedCheckpoint(wire::EventFinalizedCheckpoint {
                epoch: 3,
                ..Default::default()
            }),
        ))
        .await;
    let envelope = harness.next().await;
    assert_eq!(envelope.event, Topic::FinalizedCheckpoint);
    let checkpoint: wire::EventFinalizedCheckpoint = envelope.data.unpack().unwrap();
    assert_eq!(checkpoint.epoch, 3);
}

#[tokio::test]
async fn test_unmapped_state_kinds_produce_nothing() {
    let mut harness = Harness::start(&["head"]).await;
    let states = harness.feeds.state_feed().clone();

    states
        .send(StateFeedEvent::new(
            StateEventKind::Synced,
            EventPayload::Synced(SyncedData { start_time: 1 }),
        ))
        .await;
    states.send(head(20, 0x20)).await;

    let message: EventHead = harness.next().await.data.unpack().unwrap();
    assert_eq!(message.slot, 20);
}

#[tokio::test]
async fn test_mismatched_payload_dropped_silently() {
    let mut harness = Harness::start(&["head"]).await;
    let states = harness.feeds.state_feed().clone();

    states
        .send(StateFeedEvent::new(
            StateEventKind::NewHead,
            EventPayload::Synced(SyncedData { start_time: 1 }),
        ))
        .await;
    states.send(head(21, 0x21)).await;

    // The stream survives and the next good event comes through.
    let message: EventHead = harness.next().await.data.unpack().unwrap();
    assert_eq!(message.slot, 21);
    assert!(!harness.task.is_finished());
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_translation_failure_is_internal() {
    let mut harness = Harness::start(&["block"]).await;

    harness
        .feeds
        .block_feed()
        .send(received_block(signed_block(3, 0)))
        .await;

    let (result, feeds) = harness.finish().await;
    let err = result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
    assert!(matches!(
        err,
        StreamError::Handle {
            error: HandleError::Translate(MigrationError::InvalidSignatureLength { .. }),
            ..
        }
    ));
    assert!(err.to_string().starts_with("could not handle block event"));
    assert_eq!(feeds.total_subscribers(), 0);
}

struct RejectingSink;

#[async_trait]
impl EventSink for RejectingSink {
    async fn send(&mut self, _envelope: Envelope) -> Result<(), SinkError> {
        Err(SinkError::Write("broken pipe".into()))
    }
}

#[tokio::test]
async fn test_write_failure_is_internal() {
    let feeds = Arc::new(NodeFeeds::new());
    let (_shutdown, shutdown_rx) = watch::channel(false);
    let server = EventsServer::new(Arc::clone(&feeds), shutdown_rx);

    let task = tokio::spawn(async move {
        server
            .stream_events(&["head"], &mut RejectingSink, CancellationToken::new())
            .await
    });

    timeout(WAIT, async {
        while feeds.total_subscribers() != 3 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    feeds.state_feed().send(head(1, 0x01)).await;

    let err = timeout(WAIT, task).await.unwrap().unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
    assert!(matches!(
        err,
        StreamError::Handle {
            error: HandleError::Send(SinkError::Write(_)),
            ..
        }
    ));
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_dropped_receiver_is_internal() {
    let mut harness = Harness::start(&["head"]).await;
    let (_, closed) = mpsc::channel(1);
    // Swap in a fresh receiver so the stream's one is dropped here.
    drop(std::mem::replace(&mut harness.envelopes, closed));

    harness.feeds.state_feed().send(head(1, 0x01)).await;

    let (result, feeds) = harness.finish().await;
    assert_eq!(result.unwrap_err().code(), ErrorCode::Internal);
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_service_shutdown_cancels_stream() {
    let harness = Harness::start(&["head", "chain_reorg"]).await;

    harness.shutdown.send_replace(true);

    let (result, feeds) = harness.finish().await;
    assert!(matches!(
        result,
        Err(StreamError::Canceled(CancelReason::Service))
    ));
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_closed_feed_ends_stream() {
    let harness = Harness::start(&["finalized_checkpoint"]).await;

    harness.feeds.operation_feed().close();

    let (result, _) = harness.finish().await;
    let err = result.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
    assert_eq!(err.to_string(), "operation feed closed");
}

#[tokio::test]
async fn test_subscribe_to_closed_feed_fails_without_output() {
    let feeds = Arc::new(NodeFeeds::new());
    feeds.block_feed().close();
    let (_shutdown, shutdown_rx) = watch::channel(false);
    let server = EventsServer::new(Arc::clone(&feeds), shutdown_rx);
    let (mut tx, mut rx) = mpsc::channel::<Envelope>(1);

    let err = server
        .stream_events(&["block"], &mut tx, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StreamError::Subscribe(_)));
    assert_eq!(err.code(), ErrorCode::Internal);

    drop(tx);
    assert!(rx.recv().await.is_none());
    assert_eq!(feeds.total_subscribers(), 0);
}

#[tokio::test]
async fn test_invalid_topics_never_subscribe() {
    let feeds = Arc::new(NodeFeeds::new());
    let (_shutdown, shutdown_rx) = watch::channel(false);
    let server = EventsServer::new(Arc::clone(&feeds), shutdown_rx);
    let (mut tx, _rx) = mpsc::channel::<Envelope>(1);

    let err = server
        .stream_events(&["head", "Head"], &mut tx, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(
        err.to_string(),
        "invalid argument: topic Head not allowed for event subscriptions"
    );
    assert_eq!(feeds.block_feed().subscriber_count(), 0);
    assert_eq!(feeds.total_subscribers(), 0);
}
