//! Wire and domain types for the topic graph.
//!
//! Three node kinds live in the graph:
//! - `Topic`, keyed by `name`, carrying `messageCount` and `lastUpdated`
//! - `Producer`, keyed by `id`, carrying `lastSeen`
//! - `Consumer`, keyed by `id`, carrying an optional `group` and `lastSeen`
//!
//! Producers reach topics through `PUBLISHES_TO` (with its own
//! `messageCount`), consumers through `SUBSCRIBES_TO`.
//!
//! Request and response bodies use camelCase field names so the gateway and
//! the dashboard client share one definition of the JSON contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph label for topic nodes
pub const TOPIC_LABEL: &str = "Topic";
/// Graph label for producer nodes
pub const PRODUCER_LABEL: &str = "Producer";
/// Graph label for consumer nodes
pub const CONSUMER_LABEL: &str = "Consumer";
/// Producer -> Topic relationship type
pub const PUBLISHES_TO: &str = "PUBLISHES_TO";
/// Consumer -> Topic relationship type
pub const SUBSCRIBES_TO: &str = "SUBSCRIBES_TO";

/// Maximum rows returned by the list endpoints
pub const LIST_LIMIT: usize = 100;
/// Maximum rows returned by the chart endpoints
pub const CHART_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Topic,
    Producer,
    Consumer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Topic, EntityKind::Producer, EntityKind::Consumer];

    /// Graph label of the node kind
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Topic => TOPIC_LABEL,
            EntityKind::Producer => PRODUCER_LABEL,
            EntityKind::Consumer => CONSUMER_LABEL,
        }
    }

    /// Name of the identity attribute
    pub fn identity_field(&self) -> &'static str {
        match self {
            EntityKind::Topic => "name",
            EntityKind::Producer | EntityKind::Consumer => "id",
        }
    }

    /// Bucket name used by the entity distribution chart
    pub fn bucket(&self) -> &'static str {
        match self {
            EntityKind::Topic => "Topics",
            EntityKind::Producer => "Producers",
            EntityKind::Consumer => "Consumers",
        }
    }

    /// Collection segment under `/api`
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Topic => "topics",
            EntityKind::Producer => "producers",
            EntityKind::Consumer => "consumers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =========================
// Responses
// =========================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub name: String,
    pub message_count: u64,
    pub producer_count: u64,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerSummary {
    pub id: String,
    pub topic_count: u64,
    pub message_count: u64,
    pub last_seen: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerSummary {
    pub id: String,
    pub topic_count: u64,
    pub last_seen: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub topics: u64,
    pub producers: u64,
    pub consumers: u64,
    pub relations: u64,
    pub nodes: u64,
}

impl Stats {
    /// Combine the four independent counts; `nodes` is always derived.
    pub fn from_counts(topics: u64, producers: u64, consumers: u64, relations: u64) -> Self {
        Self {
            topics,
            producers,
            consumers,
            relations,
            nodes: topics + producers + consumers,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub name: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerActivity {
    pub id: String,
    pub topics: u64,
    pub messages: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub name: String,
    pub count: u64,
}

/// Acknowledgement returned by every write endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub engine: String,
}

// =========================
// Requests
// =========================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProducer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProducer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConsumer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsumer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
}

// =========================
// Validated store inputs
// =========================

/// Changes applied to an existing topic. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicPatch {
    pub new_name: Option<String>,
    pub message_count: Option<u64>,
}

/// Changes applied to an existing producer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProducerPatch {
    pub new_id: Option<String>,
}

/// Changes applied to an existing consumer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumerPatch {
    pub new_id: Option<String>,
    pub group: Option<String>,
}
