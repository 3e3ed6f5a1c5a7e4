//! Request-level operations over a `GraphStore`.
//!
//! `GraphService` owns the rules that sit above raw graph access:
//! - required identity fields and non-negative counts (`Validation`)
//! - updates that match nothing (`NotFound`)
//! - relationship merges against absent endpoints (`NotFound` when strict)
//! - idempotent deletes
//!
//! It is cheap to clone and is handed to request handlers as shared state.

use crate::aggregate;
use crate::model::{
    Ack, ConsumerPatch, ConsumerSummary, CreateConsumer, CreateProducer, CreateTopic,
    EntityCount, EntityKind, ProducerActivity, ProducerPatch, ProducerSummary, PublishLink,
    Stats, SubscribeLink, TopicCount, TopicPatch, TopicSummary, UpdateConsumer, UpdateProducer,
    UpdateTopic, CHART_LIMIT, LIST_LIMIT,
};
use crate::numeric;
use crate::store::GraphStore;
use crate::{GraphError, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct GraphService {
    store: Arc<dyn GraphStore>,
    strict_relationships: bool,
}

/// Treat absent and empty identities alike.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn validated_count(value: Option<i64>) -> Result<Option<u64>> {
    match numeric::message_count(value) {
        None => Ok(None),
        Some(Ok(count)) => Ok(Some(count)),
        Some(Err(_)) => Err(GraphError::Validation(
            "messageCount must be a non-negative integer".into(),
        )),
    }
}

impl GraphService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            strict_relationships: true,
        }
    }

    /// When false, merging a relationship against a missing node succeeds
    /// silently instead of failing with `NotFound`.
    pub fn with_strict_relationships(mut self, strict: bool) -> Self {
        self.strict_relationships = strict;
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub async fn health(&self) -> Result<()> {
        self.store.ping().await
    }

    // =========================
    // Reads
    // =========================

    pub async fn topics(&self) -> Result<Vec<TopicSummary>> {
        self.store.list_topics(LIST_LIMIT).await
    }

    pub async fn producers(&self) -> Result<Vec<ProducerSummary>> {
        self.store.list_producers(LIST_LIMIT).await
    }

    pub async fn consumers(&self) -> Result<Vec<ConsumerSummary>> {
        self.store.list_consumers(LIST_LIMIT).await
    }

    pub async fn stats(&self) -> Result<Stats> {
        aggregate::stats(self.store.as_ref()).await
    }

    pub async fn topic_distribution(&self) -> Result<Vec<TopicCount>> {
        self.store.topic_distribution(CHART_LIMIT).await
    }

    pub async fn producer_activity(&self) -> Result<Vec<ProducerActivity>> {
        self.store.producer_activity(CHART_LIMIT).await
    }

    pub async fn entity_distribution(&self) -> Result<Vec<EntityCount>> {
        aggregate::entity_distribution(self.store.as_ref()).await
    }

    // =========================
    // Topics
    // =========================

    pub async fn create_topic(&self, req: CreateTopic) -> Result<Ack> {
        let name = present(req.name)
            .ok_or_else(|| GraphError::Validation("Topic name is required".into()))?;
        let count = validated_count(req.message_count)?.unwrap_or(0);

        self.store.upsert_topic(&name, count).await?;
        info!(target: "service", name = %name, message_count = count, "Topic upserted");
        Ok(Ack::ok(format!("Topic '{}' created successfully", name)))
    }

    pub async fn update_topic(&self, name: &str, req: UpdateTopic) -> Result<Ack> {
        let patch = TopicPatch {
            new_name: present(req.new_name),
            message_count: validated_count(req.message_count)?,
        };
        if !self.store.update_topic(name, &patch).await? {
            return Err(GraphError::NotFound("Topic not found".into()));
        }
        info!(target: "service", name = %name, renamed_to = ?patch.new_name, "Topic updated");
        Ok(Ack::ok(format!("Topic '{}' updated successfully", name)))
    }

    pub async fn delete_topic(&self, name: &str) -> Result<Ack> {
        self.delete(EntityKind::Topic, name).await
    }

    // =========================
    // Producers
    // =========================

    pub async fn create_producer(&self, req: CreateProducer) -> Result<Ack> {
        let id = present(req.id)
            .ok_or_else(|| GraphError::Validation("Producer ID is required".into()))?;

        self.store.upsert_producer(&id).await?;
        info!(target: "service", id = %id, "Producer upserted");
        Ok(Ack::ok(format!("Producer '{}' created successfully", id)))
    }

    pub async fn update_producer(&self, id: &str, req: UpdateProducer) -> Result<Ack> {
        let patch = ProducerPatch {
            new_id: present(req.new_id),
        };
        if !self.store.update_producer(id, &patch).await? {
            return Err(GraphError::NotFound("Producer not found".into()));
        }
        info!(target: "service", id = %id, renamed_to = ?patch.new_id, "Producer updated");
        Ok(Ack::ok(format!("Producer '{}' updated successfully", id)))
    }

    pub async fn delete_producer(&self, id: &str) -> Result<Ack> {
        self.delete(EntityKind::Producer, id).await
    }

    // =========================
    // Consumers
    // =========================

    pub async fn create_consumer(&self, req: CreateConsumer) -> Result<Ack> {
        let id = present(req.id)
            .ok_or_else(|| GraphError::Validation("Consumer ID is required".into()))?;

        self.store.upsert_consumer(&id, present(req.group)).await?;
        info!(target: "service", id = %id, "Consumer upserted");
        Ok(Ack::ok(format!("Consumer '{}' created successfully", id)))
    }

    pub async fn update_consumer(&self, id: &str, req: UpdateConsumer) -> Result<Ack> {
        let patch = ConsumerPatch {
            new_id: present(req.new_id),
            group: req.group,
        };
        if !self.store.update_consumer(id, &patch).await? {
            return Err(GraphError::NotFound("Consumer not found".into()));
        }
        info!(target: "service", id = %id, renamed_to = ?patch.new_id, "Consumer updated");
        Ok(Ack::ok(format!("Consumer '{}' updated successfully", id)))
    }

    pub async fn delete_consumer(&self, id: &str) -> Result<Ack> {
        self.delete(EntityKind::Consumer, id).await
    }

    async fn delete(&self, kind: EntityKind, key: &str) -> Result<Ack> {
        // deleting an absent identity is still a success
        let removed = self.store.delete_node(kind, key).await?;
        info!(target: "service", kind = %kind, key = %key, removed, "Node deleted");
        Ok(Ack::ok(format!("{} '{}' deleted successfully", kind, key)))
    }

    // =========================
    // Relationships
    // =========================

    pub async fn link_publisher(&self, req: PublishLink) -> Result<Ack> {
        let (producer_id, topic_name) = match (present(req.producer_id), present(req.topic_name))
        {
            (Some(p), Some(t)) => (p, t),
            _ => {
                return Err(GraphError::Validation(
                    "Producer ID and Topic name are required".into(),
                ))
            }
        };
        let count = validated_count(req.message_count)?.unwrap_or(0);

        let linked = self
            .store
            .merge_publishes(&producer_id, &topic_name, count)
            .await?;
        if !linked && self.strict_relationships {
            return Err(GraphError::NotFound(format!(
                "Producer '{}' or Topic '{}' not found",
                producer_id, topic_name
            )));
        }
        info!(target: "service", producer = %producer_id, topic = %topic_name, linked, "PUBLISHES_TO merged");
        Ok(Ack::ok("Relationship created successfully"))
    }

    pub async fn link_subscriber(&self, req: SubscribeLink) -> Result<Ack> {
        let (consumer_id, topic_name) = match (present(req.consumer_id), present(req.topic_name))
        {
            (Some(c), Some(t)) => (c, t),
            _ => {
                return Err(GraphError::Validation(
                    "Consumer ID and Topic name are required".into(),
                ))
            }
        };

        let linked = self.store.merge_subscribes(&consumer_id, &topic_name).await?;
        if !linked && self.strict_relationships {
            return Err(GraphError::NotFound(format!(
                "Consumer '{}' or Topic '{}' not found",
                consumer_id, topic_name
            )));
        }
        info!(target: "service", consumer = %consumer_id, topic = %topic_name, linked, "SUBSCRIBES_TO merged");
        Ok(Ack::ok("Subscription created successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockGraphStore;

    fn service(mock: MockGraphStore) -> GraphService {
        GraphService::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn create_topic_without_name_never_touches_store() {
        let mut mock = MockGraphStore::new();
        mock.expect_upsert_topic().never();

        let err = service(mock)
            .create_topic(CreateTopic {
                name: Some(String::new()),
                message_count: Some(3),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Validation(msg) if msg == "Topic name is required"));
    }

    #[tokio::test]
    async fn negative_message_count_is_rejected() {
        let mut mock = MockGraphStore::new();
        mock.expect_upsert_topic().never();

        let err = service(mock)
            .create_topic(CreateTopic {
                name: Some("orders".into()),
                message_count: Some(-4),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }

    #[tokio::test]
    async fn update_miss_maps_to_not_found() {
        let mut mock = MockGraphStore::new();
        mock.expect_update_topic().returning(|_, _| Ok(false));

        let err = service(mock)
            .update_topic("ghost", UpdateTopic::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound(msg) if msg == "Topic not found"));
    }

    #[tokio::test]
    async fn empty_new_name_is_not_a_rename() {
        let mut mock = MockGraphStore::new();
        mock.expect_update_topic()
            .withf(|name, patch| name == "orders" && patch.new_name.is_none())
            .returning(|_, _| Ok(true));

        let ack = service(mock)
            .update_topic(
                "orders",
                UpdateTopic {
                    new_name: Some(String::new()),
                    message_count: None,
                },
            )
            .await
            .unwrap();
        assert!(ack.success);
    }

    #[tokio::test]
    async fn delete_of_absent_node_succeeds() {
        let mut mock = MockGraphStore::new();
        mock.expect_delete_node().returning(|_, _| Ok(0));

        let ack = service(mock).delete_producer("nobody").await.unwrap();
        assert!(ack.success);
        assert_eq!(ack.message, "Producer 'nobody' deleted successfully");
    }

    #[tokio::test]
    async fn relationship_miss_honours_strictness() {
        let mut strict = MockGraphStore::new();
        strict.expect_merge_subscribes().returning(|_, _| Ok(false));
        let err = service(strict)
            .link_subscriber(SubscribeLink {
                consumer_id: Some("c".into()),
                topic_name: Some("t".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));

        let mut lenient = MockGraphStore::new();
        lenient.expect_merge_subscribes().returning(|_, _| Ok(false));
        let ack = service(lenient)
            .with_strict_relationships(false)
            .link_subscriber(SubscribeLink {
                consumer_id: Some("c".into()),
                topic_name: Some("t".into()),
            })
            .await
            .unwrap();
        assert!(ack.success);
    }

    #[tokio::test]
    async fn stats_fail_when_any_count_fails() {
        let mut mock = MockGraphStore::new();
        mock.expect_count_nodes().returning(|_| Ok(4));
        mock.expect_count_relationships()
            .returning(|| Err(GraphError::Engine("connection reset".into())));

        let err = service(mock).stats().await.unwrap_err();
        assert!(matches!(err, GraphError::Engine(msg) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn stats_nodes_is_sum_of_kinds() {
        let mut mock = MockGraphStore::new();
        mock.expect_count_nodes().returning(|kind| {
            Ok(match kind {
                EntityKind::Topic => 3,
                EntityKind::Producer => 2,
                EntityKind::Consumer => 7,
            })
        });
        mock.expect_count_relationships().returning(|| Ok(11));

        let stats = service(mock).stats().await.unwrap();
        assert_eq!(stats.nodes, 12);
        assert_eq!(stats.relations, 11);
    }
}
