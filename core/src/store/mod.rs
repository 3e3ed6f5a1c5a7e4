//! Graph store abstraction.
//!
//! `GraphStore` is the seam between the service layer and a concrete graph
//! engine:
//! - `Neo4jStore` - Bolt connection pool against a Neo4j database
//! - `InMemoryStore` - process-local graph for demos and tests
//!
//! Writes report whether their target matched so callers can decide how to
//! surface a miss; reads return projections with numerics already
//! normalized.

pub mod cypher;
mod memory;
mod neo4j;

pub use memory::InMemoryStore;
pub use neo4j::Neo4jStore;

use crate::model::{
    ConsumerPatch, ConsumerSummary, EntityKind, ProducerActivity, ProducerPatch, ProducerSummary,
    TopicCount, TopicPatch, TopicSummary,
};
use crate::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Short engine name reported in logs
    fn engine(&self) -> &'static str;

    /// Verify the engine is reachable
    async fn ping(&self) -> Result<()>;

    /// Install identity uniqueness constraints (idempotent)
    async fn ensure_schema(&self) -> Result<()>;

    async fn list_topics(&self, limit: usize) -> Result<Vec<TopicSummary>>;
    async fn list_producers(&self, limit: usize) -> Result<Vec<ProducerSummary>>;
    async fn list_consumers(&self, limit: usize) -> Result<Vec<ConsumerSummary>>;

    async fn count_nodes(&self, kind: EntityKind) -> Result<u64>;
    /// Count relationships of every type
    async fn count_relationships(&self) -> Result<u64>;

    async fn topic_distribution(&self, limit: usize) -> Result<Vec<TopicCount>>;
    async fn producer_activity(&self, limit: usize) -> Result<Vec<ProducerActivity>>;

    async fn upsert_topic(&self, name: &str, message_count: u64) -> Result<()>;
    /// Returns false when no topic with `name` exists
    async fn update_topic(&self, name: &str, patch: &TopicPatch) -> Result<bool>;

    async fn upsert_producer(&self, id: &str) -> Result<()>;
    async fn update_producer(&self, id: &str, patch: &ProducerPatch) -> Result<bool>;

    async fn upsert_consumer(&self, id: &str, group: Option<String>) -> Result<()>;
    async fn update_consumer(&self, id: &str, patch: &ConsumerPatch) -> Result<bool>;

    /// Detach-delete a node. Returns the number of nodes removed (0 or 1).
    async fn delete_node(&self, kind: EntityKind, key: &str) -> Result<u64>;

    /// Merge PUBLISHES_TO between existing nodes. False if either is absent.
    async fn merge_publishes(
        &self,
        producer_id: &str,
        topic_name: &str,
        message_count: u64,
    ) -> Result<bool>;

    /// Merge SUBSCRIBES_TO between existing nodes. False if either is absent.
    async fn merge_subscribes(&self, consumer_id: &str, topic_name: &str) -> Result<bool>;
}
