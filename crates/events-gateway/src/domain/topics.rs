//! Topic registry.
//!
//! The six topics a client may subscribe to. Nothing outside this list is
//! accepted on a request or emitted on a stream.

use super::error::StreamError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A subscribable event topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Head,
    Block,
    Attestation,
    VoluntaryExit,
    FinalizedCheckpoint,
    ChainReorg,
}

impl Topic {
    /// Every recognized topic.
    pub const ALL: [Topic; 6] = [
        Topic::Head,
        Topic::Block,
        Topic::Attestation,
        Topic::VoluntaryExit,
        Topic::FinalizedCheckpoint,
        Topic::ChainReorg,
    ];

    /// Wire name of the topic.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Block => "block",
            Self::Attestation => "attestation",
            Self::VoluntaryExit => "voluntary_exit",
            Self::FinalizedCheckpoint => "finalized_checkpoint",
            Self::ChainReorg => "chain_reorg",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("topic {0} not allowed for event subscriptions")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    /// Names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

/// The validated set of topics one stream asked for.
///
/// Built once per call and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicSet(u8);

impl TopicSet {
    #[must_use]
    pub fn contains(&self, topic: Topic) -> bool {
        self.0 & topic.bit() != 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Topics in registry order.
    pub fn iter(&self) -> impl Iterator<Item = Topic> + '_ {
        Topic::ALL.into_iter().filter(|t| self.contains(*t))
    }

    fn with(self, topic: Topic) -> Self {
        Self(self.0 | topic.bit())
    }
}

impl FromIterator<Topic> for TopicSet {
    fn from_iter<I: IntoIterator<Item = Topic>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::with)
    }
}

impl fmt::Display for TopicSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, topic) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(topic.as_str())?;
        }
        Ok(())
    }
}

/// Validate a subscription request.
///
/// Fails with an invalid-argument error when `topics` is empty or names a
/// topic outside the registry. Duplicates are accepted and collapse.
pub fn validate_topics<S: AsRef<str>>(topics: &[S]) -> Result<TopicSet, StreamError> {
    if topics.is_empty() {
        return Err(StreamError::InvalidArgument(
            "no topics specified to subscribe to".into(),
        ));
    }

    topics
        .iter()
        .map(|name| {
            name.as_ref()
                .parse::<Topic>()
                .map_err(|e| StreamError::InvalidArgument(e.to_string()))
        })
        .collect()
}
