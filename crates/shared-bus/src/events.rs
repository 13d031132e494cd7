//! # Node Events
//!
//! Raw events published on the three internal feeds, and the typed views the
//! consumers match on.
//!
//! A raw [`FeedEvent`] pairs a per-source kind with a payload drawn from the
//! shared [`EventPayload`] union, so nothing in the type system stops a
//! publisher from attaching the wrong payload to a kind. Consumers convert
//! raw events into [`BlockEvent`], [`OperationEvent`] or [`StateEvent`]; a
//! kind/payload disagreement surfaces once, as [`PayloadMismatch`].

use shared_types::entities::{
    Attestation, Root, SignedAggregateAttestationAndProof, SignedBeaconBlock,
    SignedVoluntaryExit, Slot, ValidatorIndex,
};
use shared_types::wire::{EventChainReorg, EventFinalizedCheckpoint, EventHead};
use std::fmt;
use thiserror::Error;

/// The three internal event sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Block,
    Operation,
    State,
}

impl EventSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Operation => "operation",
            Self::State => "state",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// KINDS
// =============================================================================

/// Block feed event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockEventKind {
    /// A block was received via gossip or RPC and passed initial checks.
    ReceivedBlock,
}

/// Operation feed event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationEventKind {
    UnaggregatedAttReceived,
    AggregatedAttReceived,
    ExitReceived,
    SyncCommitteeContributionReceived,
}

/// State feed event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEventKind {
    NewHead,
    BlockProcessed,
    ChainStarted,
    Initialized,
    Synced,
    Reorg,
    FinalizedCheckpoint,
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedBlockData {
    pub signed_block: SignedBeaconBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaggregatedAttReceivedData {
    pub attestation: Attestation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedAttReceivedData {
    pub attestation: SignedAggregateAttestationAndProof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReceivedData {
    pub exit: SignedVoluntaryExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommitteeContributionReceivedData {
    pub slot: Slot,
    pub subcommittee_index: u64,
    pub aggregator_index: ValidatorIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProcessedData {
    pub slot: Slot,
    pub block_root: Root,
    pub verified: bool,
}

/// Genesis time of the chain, Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStartedData {
    pub start_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializedData {
    pub start_time: u64,
    pub genesis_validators_root: Root,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedData {
    pub start_time: u64,
}

/// Every payload any feed may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    ReceivedBlock(ReceivedBlockData),
    UnaggregatedAtt(UnaggregatedAttReceivedData),
    AggregatedAtt(AggregatedAttReceivedData),
    Exit(ExitReceivedData),
    SyncCommitteeContribution(SyncCommitteeContributionReceivedData),
    Head(EventHead),
    BlockProcessed(BlockProcessedData),
    ChainStarted(ChainStartedData),
    Initialized(InitializedData),
    Synced(SyncedData),
    Reorg(EventChainReorg),
    FinalizedCheckpoint(EventFinalizedCheckpoint),
}

impl EventPayload {
    /// Variant name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceivedBlock(_) => "ReceivedBlock",
            Self::UnaggregatedAtt(_) => "UnaggregatedAtt",
            Self::AggregatedAtt(_) => "AggregatedAtt",
            Self::Exit(_) => "Exit",
            Self::SyncCommitteeContribution(_) => "SyncCommitteeContribution",
            Self::Head(_) => "Head",
            Self::BlockProcessed(_) => "BlockProcessed",
            Self::ChainStarted(_) => "ChainStarted",
            Self::Initialized(_) => "Initialized",
            Self::Synced(_) => "Synced",
            Self::Reorg(_) => "Reorg",
            Self::FinalizedCheckpoint(_) => "FinalizedCheckpoint",
        }
    }
}

/// A raw event as published on a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent<K> {
    pub kind: K,
    pub data: EventPayload,
}

impl<K> FeedEvent<K> {
    pub fn new(kind: K, data: EventPayload) -> Self {
        Self { kind, data }
    }
}

pub type BlockFeedEvent = FeedEvent<BlockEventKind>;
pub type OperationFeedEvent = FeedEvent<OperationEventKind>;
pub type StateFeedEvent = FeedEvent<StateEventKind>;

/// The payload attached to an event does not match its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{feed} event {kind} carried unexpected payload {payload}")]
pub struct PayloadMismatch {
    pub feed: EventSource,
    pub kind: String,
    pub payload: &'static str,
}

impl PayloadMismatch {
    fn new<K: fmt::Debug>(feed: EventSource, kind: K, payload: &EventPayload) -> Self {
        Self {
            feed,
            kind: format!("{kind:?}"),
            payload: payload.name(),
        }
    }
}

// =============================================================================
// TYPED VIEWS
// =============================================================================

/// Block feed event with its payload checked against the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent {
    ReceivedBlock(ReceivedBlockData),
}

impl TryFrom<BlockFeedEvent> for BlockEvent {
    type Error = PayloadMismatch;

    fn try_from(event: BlockFeedEvent) -> Result<Self, Self::Error> {
        match (event.kind, event.data) {
            (BlockEventKind::ReceivedBlock, EventPayload::ReceivedBlock(d)) => {
                Ok(Self::ReceivedBlock(d))
            }
            (kind, data) => Err(PayloadMismatch::new(EventSource::Block, kind, &data)),
        }
    }
}

/// Operation feed event with its payload checked against the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationEvent {
    UnaggregatedAttReceived(UnaggregatedAttReceivedData),
    AggregatedAttReceived(AggregatedAttReceivedData),
    ExitReceived(ExitReceivedData),
    SyncCommitteeContributionReceived(SyncCommitteeContributionReceivedData),
}

impl TryFrom<OperationFeedEvent> for OperationEvent {
    type Error = PayloadMismatch;

    fn try_from(event: OperationFeedEvent) -> Result<Self, Self::Error> {
        use OperationEventKind as K;
        match (event.kind, event.data) {
            (K::UnaggregatedAttReceived, EventPayload::UnaggregatedAtt(d)) => {
                Ok(Self::UnaggregatedAttReceived(d))
            }
            (K::AggregatedAttReceived, EventPayload::AggregatedAtt(d)) => {
                Ok(Self::AggregatedAttReceived(d))
            }
            (K::ExitReceived, EventPayload::Exit(d)) => Ok(Self::ExitReceived(d)),
            (K::SyncCommitteeContributionReceived, EventPayload::SyncCommitteeContribution(d)) => {
                Ok(Self::SyncCommitteeContributionReceived(d))
            }
            (kind, data) => Err(PayloadMismatch::new(EventSource::Operation, kind, &data)),
        }
    }
}

/// State feed event with its payload checked against the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    NewHead(EventHead),
    BlockProcessed(BlockProcessedData),
    ChainStarted(ChainStartedData),
    Initialized(InitializedData),
    Synced(SyncedData),
    Reorg(EventChainReorg),
    FinalizedCheckpoint(EventFinalizedCheckpoint),
}

impl TryFrom<StateFeedEvent> for StateEvent {
    type Error = PayloadMismatch;

    fn try_from(event: StateFeedEvent) -> Result<Self, Self::Error> {
        use StateEventKind as K;
        match (event.kind, event.data) {
            (K::NewHead, EventPayload::Head(d)) => Ok(Self::NewHead(d)),
            (K::BlockProcessed, EventPayload::BlockProcessed(d)) => Ok(Self::BlockProcessed(d)),
            (K::ChainStarted, EventPayload::ChainStarted(d)) => Ok(Self::ChainStarted(d)),
            (K::Initialized, EventPayload::Initialized(d)) => Ok(Self::Initialized(d)),
            (K::Synced, EventPayload::Synced(d)) => Ok(Self::Synced(d)),
            (K::Reorg, EventPayload::Reorg(d)) => Ok(Self::Reorg(d)),
            (K::FinalizedCheckpoint, EventPayload::FinalizedCheckpoint(d)) => {
                Ok(Self::FinalizedCheckpoint(d))
            }
            (kind, data) => Err(PayloadMismatch::new(EventSource::State, kind, &data)),
        }
    }
}
