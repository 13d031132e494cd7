//! # Core Domain Entities
//!
//! Beacon-chain entities in the node's internal representation. These are the
//! payloads carried by the internal block, operation and state feeds; clients
//! never see them directly (see [`crate::wire`] for what goes over the wire).
//!
//! ## Clusters
//!
//! - **Chain**: `SignedBeaconBlock` (fork-tagged), `BeaconBlock`, `BeaconBlockBody`
//! - **Operations**: `Attestation`, `SignedAggregateAttestationAndProof`,
//!   `SignedVoluntaryExit`
//! - **Primitives**: `Root`, `Slot`, `Epoch`, `Checkpoint`

use crate::errors::MigrationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Slot number.
pub type Slot = u64;

/// Epoch number.
pub type Epoch = u64;

/// Index of a validator in the registry.
pub type ValidatorIndex = u64;

/// Index of a committee within a slot.
pub type CommitteeIndex = u64;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte root (block root, state root, body root).
///
/// Serializes as a `0x`-prefixed hex string for human-readable formats and as
/// raw bytes otherwise, so hashing through bincode stays compact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Root(pub [u8; 32]);

impl Root {
    /// Root with every byte set to `byte`. Handy for fixtures.
    #[must_use]
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; 32])
    }

    /// SHA-256 over the canonical bincode encoding of `value`.
    pub fn hash_of<T: Serialize>(value: &T) -> Result<Self, MigrationError> {
        let encoded =
            bincode::serialize(value).map_err(|e| MigrationError::Encode(e.to_string()))?;
        Ok(Self(Sha256::digest(&encoded).into()))
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Root {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root({self})")
    }
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Root {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let raw = s.strip_prefix("0x").unwrap_or(&s);
            let bytes = hex::decode(raw).map_err(serde::de::Error::custom)?;
            let bytes: [u8; 32] = bytes
                .try_into()
                .map_err(|v: Vec<u8>| serde::de::Error::invalid_length(v.len(), &"32 bytes"))?;
            Ok(Self(bytes))
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

/// An (epoch, root) pair used by Casper FFG votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Root,
}

// =============================================================================
// CLUSTER B: OPERATIONS
// =============================================================================

/// What a validator votes for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: Slot,
    pub committee_index: CommitteeIndex,
    pub beacon_block_root: Root,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// A (possibly aggregated) attestation as gossiped between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attestation {
    /// Bitlist of committee members that signed.
    pub aggregation_bits: Vec<u8>,
    pub data: AttestationData,
    /// BLS signature over `data`.
    pub signature: Vec<u8>,
}

/// An aggregate plus the aggregator's selection proof.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateAttestationAndProof {
    pub aggregator_index: ValidatorIndex,
    pub aggregate: Attestation,
    pub selection_proof: Vec<u8>,
}

/// Signed wrapper published by aggregators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedAggregateAttestationAndProof {
    pub message: AggregateAttestationAndProof,
    pub signature: Vec<u8>,
}

/// Request by a validator to leave the active set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoluntaryExit {
    pub epoch: Epoch,
    pub validator_index: ValidatorIndex,
}

/// Signed voluntary exit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub exit: VoluntaryExit,
    pub signature: Vec<u8>,
}

// =============================================================================
// CLUSTER C: THE CHAIN
// =============================================================================

/// Body shared by every fork.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeaconBlockBody {
    pub randao_reveal: Vec<u8>,
    pub graffiti: Root,
    pub attestations: Vec<Attestation>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

/// Sync committee participation, introduced with Altair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncAggregate {
    pub sync_committee_bits: Vec<u8>,
    pub sync_committee_signature: Vec<u8>,
}

/// Altair body: the phase 0 body plus the sync aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AltairBeaconBlockBody {
    pub base: BeaconBlockBody,
    pub sync_aggregate: SyncAggregate,
}

/// A block message, generic over the fork's body type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeaconBlock<B> {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body: B,
}

/// A signed block message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedBlock<B> {
    pub block: BeaconBlock<B>,
    pub signature: Vec<u8>,
}

/// A signed block of any supported fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedBeaconBlock {
    Phase0(SignedBlock<BeaconBlockBody>),
    Altair(SignedBlock<AltairBeaconBlockBody>),
}

impl SignedBeaconBlock {
    #[must_use]
    pub fn slot(&self) -> Slot {
        match self {
            Self::Phase0(b) => b.block.slot,
            Self::Altair(b) => b.block.slot,
        }
    }

    #[must_use]
    pub fn proposer_index(&self) -> ValidatorIndex {
        match self {
            Self::Phase0(b) => b.block.proposer_index,
            Self::Altair(b) => b.block.proposer_index,
        }
    }

    #[must_use]
    pub fn parent_root(&self) -> Root {
        match self {
            Self::Phase0(b) => b.block.parent_root,
            Self::Altair(b) => b.block.parent_root,
        }
    }

    #[must_use]
    pub fn state_root(&self) -> Root {
        match self {
            Self::Phase0(b) => b.block.state_root,
            Self::Altair(b) => b.block.state_root,
        }
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        match self {
            Self::Phase0(b) => &b.signature,
            Self::Altair(b) => &b.signature,
        }
    }

    /// Content hash of the fork-specific body.
    pub fn body_root(&self) -> Result<Root, MigrationError> {
        match self {
            Self::Phase0(b) => Root::hash_of(&b.block.body),
            Self::Altair(b) => Root::hash_of(&b.block.body),
        }
    }

    /// Fork name, for logging.
    #[must_use]
    pub fn fork(&self) -> &'static str {
        match self {
            Self::Phase0(_) => "phase0",
            Self::Altair(_) => "altair",
        }
    }
}
