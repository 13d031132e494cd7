//! # v1 Wire Types
//!
//! The stable, versioned representation clients receive on the events stream.
//! Internal entities are converted into these by [`crate::migration`]; the
//! state feed already publishes the `Event*` types directly.
//!
//! Every wire message implements [`WireMessage`] so it can be packed into an
//! [`AnyMessage`], the self-describing container written to clients.

use crate::entities::{CommitteeIndex, Epoch, Root, Slot, ValidatorIndex};
use crate::errors::{AnyMessageError, MigrationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Length of a BLS signature on the wire.
pub const SIGNATURE_LENGTH: usize = 96;

const TYPE_URL_PREFIX: &str = "type.googleapis.com/ethereum.eth.v1.";

/// `0x`-prefixed hex encoding for byte vectors.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}

/// A message that can travel inside an [`AnyMessage`].
pub trait WireMessage: Serialize + DeserializeOwned {
    /// Fully qualified message name, without the URL prefix.
    const MESSAGE_NAME: &'static str;

    /// Type URL identifying this message inside an [`AnyMessage`].
    fn type_url() -> String {
        format!("{TYPE_URL_PREFIX}{}", Self::MESSAGE_NAME)
    }
}

/// Self-describing container: a type URL plus the message as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyMessage {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub value: serde_json::Value,
}

impl AnyMessage {
    /// Pack a wire message.
    pub fn pack<M: WireMessage>(message: &M) -> Result<Self, AnyMessageError> {
        Ok(Self {
            type_url: M::type_url(),
            value: serde_json::to_value(message)?,
        })
    }

    /// Unpack into `M`, checking the type URL first.
    pub fn unpack<M: WireMessage>(&self) -> Result<M, AnyMessageError> {
        let expected = M::type_url();
        if self.type_url != expected {
            return Err(AnyMessageError::TypeMismatch {
                expected,
                actual: self.type_url.clone(),
            });
        }
        Ok(serde_json::from_value(self.value.clone())?)
    }

    /// Whether this container holds an `M`.
    #[must_use]
    pub fn is<M: WireMessage>(&self) -> bool {
        self.type_url == M::type_url()
    }
}

macro_rules! wire_message {
    ($ty:ty, $name:literal) => {
        impl WireMessage for $ty {
            const MESSAGE_NAME: &'static str = $name;
        }
    };
}

// =============================================================================
// BLOCKS
// =============================================================================

/// v1 block header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body_root: Root,
}

/// v1 signed block header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

impl SignedBeaconBlockHeader {
    /// Block root: content hash of the signed header, signature included.
    pub fn block_root(&self) -> Result<Root, MigrationError> {
        Root::hash_of(self)
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Root,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: CommitteeIndex,
    pub beacon_block_root: Root,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attestation {
    #[serde(with = "hex_bytes")]
    pub aggregation_bits: Vec<u8>,
    pub data: AttestationData,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateAttestationAndProof {
    pub aggregator_index: ValidatorIndex,
    pub aggregate: Attestation,
    #[serde(with = "hex_bytes")]
    pub selection_proof: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedAggregateAttestationAndProof {
    pub message: AggregateAttestationAndProof,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoluntaryExit {
    pub epoch: Epoch,
    pub validator_index: ValidatorIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub message: VoluntaryExit,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

// =============================================================================
// EVENTS
// =============================================================================

/// New head of the canonical chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventHead {
    pub slot: Slot,
    pub block: Root,
    pub state: Root,
    pub epoch_transition: bool,
}

/// A block was received; reduced to its slot and root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventBlock {
    pub slot: Slot,
    pub block: Root,
}

/// A new checkpoint was finalized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventFinalizedCheckpoint {
    pub block: Root,
    pub state: Root,
    pub epoch: Epoch,
}

/// The canonical head switched to a different branch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventChainReorg {
    pub slot: Slot,
    pub depth: u64,
    pub old_head_block: Root,
    pub new_head_block: Root,
    pub old_head_state: Root,
    pub new_head_state: Root,
    pub epoch: Epoch,
}

wire_message!(Attestation, "Attestation");
wire_message!(SignedAggregateAttestationAndProof, "SignedAggregateAttestationAndProof");
wire_message!(SignedVoluntaryExit, "SignedVoluntaryExit");
wire_message!(EventHead, "EventHead");
wire_message!(EventBlock, "EventBlock");
wire_message!(EventFinalizedCheckpoint, "EventFinalizedCheckpoint");
wire_message!(EventChainReorg, "EventChainReorg");
