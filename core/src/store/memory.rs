// In-memory graph store
//
// Keeps the whole graph behind one lock so every operation observes and
// leaves a consistent graph. Used for the `memory` backend and in tests.

use crate::model::{
    ConsumerPatch, ConsumerSummary, EntityKind, ProducerActivity, ProducerPatch, ProducerSummary,
    TopicCount, TopicPatch, TopicSummary,
};
use crate::store::GraphStore;
use crate::{GraphError, Result};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default)]
struct TopicNode {
    message_count: u64,
    last_updated: String,
}

#[derive(Clone, Debug, Default)]
struct ProducerNode {
    last_seen: String,
}

#[derive(Clone, Debug, Default)]
struct ConsumerNode {
    group: Option<String>,
    last_seen: String,
}

#[derive(Clone, Debug, Default)]
struct PublishEdge {
    message_count: u64,
    last_updated: String,
}

#[derive(Clone, Debug, Default)]
struct GraphState {
    topics: BTreeMap<String, TopicNode>,
    producers: BTreeMap<String, ProducerNode>,
    consumers: BTreeMap<String, ConsumerNode>,
    // (producer id, topic name)
    publishes: HashMap<(String, String), PublishEdge>,
    // (consumer id, topic name) -> last updated
    subscribes: HashMap<(String, String), String>,
}

impl GraphState {
    fn producer_count(&self, topic: &str) -> u64 {
        self.publishes
            .keys()
            .filter(|(_, t)| t == topic)
            .map(|(p, _)| p)
            .collect::<HashSet<_>>()
            .len() as u64
    }

    fn producer_totals(&self, producer: &str) -> (u64, u64) {
        let mut topics = HashSet::new();
        let mut messages = 0u64;
        for ((p, t), edge) in &self.publishes {
            if p == producer {
                topics.insert(t);
                messages = messages.saturating_add(edge.message_count);
            }
        }
        (topics.len() as u64, messages)
    }

    fn consumer_topics(&self, consumer: &str) -> u64 {
        self.subscribes
            .keys()
            .filter(|(c, _)| c == consumer)
            .map(|(_, t)| t)
            .collect::<HashSet<_>>()
            .len() as u64
    }

    fn rename_topic(&mut self, from: &str, to: &str) {
        if let Some(node) = self.topics.remove(from) {
            self.topics.insert(to.to_string(), node);
        }
        self.publishes = std::mem::take(&mut self.publishes)
            .into_iter()
            .map(|((p, t), e)| if t == from { ((p, to.to_string()), e) } else { ((p, t), e) })
            .collect();
        self.subscribes = std::mem::take(&mut self.subscribes)
            .into_iter()
            .map(|((c, t), e)| if t == from { ((c, to.to_string()), e) } else { ((c, t), e) })
            .collect();
    }

    fn rename_producer(&mut self, from: &str, to: &str) {
        if let Some(node) = self.producers.remove(from) {
            self.producers.insert(to.to_string(), node);
        }
        self.publishes = std::mem::take(&mut self.publishes)
            .into_iter()
            .map(|((p, t), e)| if p == from { ((to.to_string(), t), e) } else { ((p, t), e) })
            .collect();
    }

    fn rename_consumer(&mut self, from: &str, to: &str) {
        if let Some(node) = self.consumers.remove(from) {
            self.consumers.insert(to.to_string(), node);
        }
        self.subscribes = std::mem::take(&mut self.subscribes)
            .into_iter()
            .map(|((c, t), e)| if c == from { ((to.to_string(), t), e) } else { ((c, t), e) })
            .collect();
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn constraint_violation(kind: EntityKind, key: &str) -> GraphError {
    GraphError::Engine(format!(
        "{} already exists with {} '{}'",
        kind.label(),
        kind.identity_field(),
        key
    ))
}

/// Process-local graph store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<GraphState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for InMemoryStore {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        // identity uniqueness is structural: nodes are keyed maps
        Ok(())
    }

    async fn list_topics(&self, limit: usize) -> Result<Vec<TopicSummary>> {
        let state = self.state.read().await;
        let mut topics: Vec<TopicSummary> = state
            .topics
            .iter()
            .map(|(name, node)| TopicSummary {
                name: name.clone(),
                message_count: node.message_count,
                producer_count: state.producer_count(name),
                status: "active".to_string(),
            })
            .collect();
        // BTreeMap order + stable sort keeps ties ordered by name
        topics.sort_by_key(|t| Reverse(t.message_count));
        topics.truncate(limit);
        Ok(topics)
    }

    async fn list_producers(&self, limit: usize) -> Result<Vec<ProducerSummary>> {
        let state = self.state.read().await;
        let mut producers: Vec<ProducerSummary> = state
            .producers
            .iter()
            .map(|(id, node)| {
                let (topic_count, message_count) = state.producer_totals(id);
                ProducerSummary {
                    id: id.clone(),
                    topic_count,
                    message_count,
                    last_seen: Some(node.last_seen.clone()),
                }
            })
            .collect();
        producers.sort_by_key(|p| Reverse(p.message_count));
        producers.truncate(limit);
        Ok(producers)
    }

    async fn list_consumers(&self, limit: usize) -> Result<Vec<ConsumerSummary>> {
        let state = self.state.read().await;
        let mut consumers: Vec<ConsumerSummary> = state
            .consumers
            .iter()
            .map(|(id, node)| ConsumerSummary {
                id: id.clone(),
                topic_count: state.consumer_topics(id),
                last_seen: Some(node.last_seen.clone()),
            })
            .collect();
        consumers.sort_by_key(|c| Reverse(c.topic_count));
        consumers.truncate(limit);
        Ok(consumers)
    }

    async fn count_nodes(&self, kind: EntityKind) -> Result<u64> {
        let state = self.state.read().await;
        let count = match kind {
            EntityKind::Topic => state.topics.len(),
            EntityKind::Producer => state.producers.len(),
            EntityKind::Consumer => state.consumers.len(),
        };
        Ok(count as u64)
    }

    async fn count_relationships(&self) -> Result<u64> {
        let state = self.state.read().await;
        Ok((state.publishes.len() + state.subscribes.len()) as u64)
    }

    async fn topic_distribution(&self, limit: usize) -> Result<Vec<TopicCount>> {
        let state = self.state.read().await;
        let mut counts: Vec<TopicCount> = state
            .topics
            .iter()
            .map(|(name, node)| TopicCount {
                name: name.clone(),
                count: node.message_count,
            })
            .collect();
        counts.sort_by_key(|t| Reverse(t.count));
        counts.truncate(limit);
        Ok(counts)
    }

    async fn producer_activity(&self, limit: usize) -> Result<Vec<ProducerActivity>> {
        let state = self.state.read().await;
        let mut activity: Vec<ProducerActivity> = state
            .producers
            .keys()
            .filter_map(|id| {
                let (topics, messages) = state.producer_totals(id);
                (topics > 0).then(|| ProducerActivity {
                    id: id.clone(),
                    topics,
                    messages,
                })
            })
            .collect();
        activity.sort_by_key(|p| Reverse(p.messages));
        activity.truncate(limit);
        Ok(activity)
    }

    async fn upsert_topic(&self, name: &str, message_count: u64) -> Result<()> {
        let mut state = self.state.write().await;
        let node = state.topics.entry(name.to_string()).or_default();
        node.message_count = message_count;
        node.last_updated = now();
        Ok(())
    }

    async fn update_topic(&self, name: &str, patch: &TopicPatch) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.topics.contains_key(name) {
            return Ok(false);
        }
        if let Some(new_name) = patch.new_name.as_deref().filter(|n| *n != name) {
            if state.topics.contains_key(new_name) {
                return Err(constraint_violation(EntityKind::Topic, new_name));
            }
        }

        let key = match patch.new_name.as_deref() {
            Some(new_name) if new_name != name => {
                state.rename_topic(name, new_name);
                new_name
            }
            _ => name,
        };
        if let Some(node) = state.topics.get_mut(key) {
            node.last_updated = now();
            if let Some(count) = patch.message_count {
                node.message_count = count;
            }
        }
        Ok(true)
    }

    async fn upsert_producer(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.producers.entry(id.to_string()).or_default().last_seen = now();
        Ok(())
    }

    async fn update_producer(&self, id: &str, patch: &ProducerPatch) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.producers.contains_key(id) {
            return Ok(false);
        }
        let key = match patch.new_id.as_deref() {
            Some(new_id) if new_id != id => {
                if state.producers.contains_key(new_id) {
                    return Err(constraint_violation(EntityKind::Producer, new_id));
                }
                state.rename_producer(id, new_id);
                new_id
            }
            _ => id,
        };
        if let Some(node) = state.producers.get_mut(key) {
            node.last_seen = now();
        }
        Ok(true)
    }

    async fn upsert_consumer(&self, id: &str, group: Option<String>) -> Result<()> {
        let mut state = self.state.write().await;
        let node = state.consumers.entry(id.to_string()).or_default();
        node.group = group;
        node.last_seen = now();
        Ok(())
    }

    async fn update_consumer(&self, id: &str, patch: &ConsumerPatch) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.consumers.contains_key(id) {
            return Ok(false);
        }
        let key = match patch.new_id.as_deref() {
            Some(new_id) if new_id != id => {
                if state.consumers.contains_key(new_id) {
                    return Err(constraint_violation(EntityKind::Consumer, new_id));
                }
                state.rename_consumer(id, new_id);
                new_id
            }
            _ => id,
        };
        if let Some(node) = state.consumers.get_mut(key) {
            node.last_seen = now();
            if let Some(group) = &patch.group {
                node.group = Some(group.clone());
            }
        }
        Ok(true)
    }

    async fn delete_node(&self, kind: EntityKind, key: &str) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = match kind {
            EntityKind::Topic => {
                state.publishes.retain(|(_, t), _| t != key);
                state.subscribes.retain(|(_, t), _| t != key);
                state.topics.remove(key).is_some()
            }
            EntityKind::Producer => {
                state.publishes.retain(|(p, _), _| p != key);
                state.producers.remove(key).is_some()
            }
            EntityKind::Consumer => {
                state.subscribes.retain(|(c, _), _| c != key);
                state.consumers.remove(key).is_some()
            }
        };
        Ok(removed as u64)
    }

    async fn merge_publishes(
        &self,
        producer_id: &str,
        topic_name: &str,
        message_count: u64,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.producers.contains_key(producer_id) || !state.topics.contains_key(topic_name) {
            return Ok(false);
        }
        let edge = state
            .publishes
            .entry((producer_id.to_string(), topic_name.to_string()))
            .or_default();
        edge.message_count = message_count;
        edge.last_updated = now();
        Ok(true)
    }

    async fn merge_subscribes(&self, consumer_id: &str, topic_name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.consumers.contains_key(consumer_id) || !state.topics.contains_key(topic_name) {
            return Ok(false);
        }
        state
            .subscribes
            .insert((consumer_id.to_string(), topic_name.to_string()), now());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rename_moves_relationships() {
        let store = InMemoryStore::new();
        store.upsert_topic("orders", 5).await.unwrap();
        store.upsert_producer("p1").await.unwrap();
        store.upsert_consumer("c1", None).await.unwrap();
        assert!(store.merge_publishes("p1", "orders", 9).await.unwrap());
        assert!(store.merge_subscribes("c1", "orders").await.unwrap());

        let patch = TopicPatch {
            new_name: Some("orders-v2".into()),
            message_count: None,
        };
        assert!(store.update_topic("orders", &patch).await.unwrap());

        let topics = store.list_topics(100).await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].name, "orders-v2");
        assert_eq!(topics[0].message_count, 5);
        assert_eq!(topics[0].producer_count, 1);
        assert_eq!(store.list_consumers(100).await.unwrap()[0].topic_count, 1);
    }

    #[tokio::test]
    async fn rename_onto_existing_identity_is_rejected() {
        let store = InMemoryStore::new();
        store.upsert_producer("a").await.unwrap();
        store.upsert_producer("b").await.unwrap();

        let patch = ProducerPatch {
            new_id: Some("b".into()),
        };
        let err = store.update_producer("a", &patch).await.unwrap_err();
        assert!(matches!(err, GraphError::Engine(_)));
        assert_eq!(store.count_nodes(EntityKind::Producer).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn publish_edge_is_upserted() {
        let store = InMemoryStore::new();
        store.upsert_topic("t", 0).await.unwrap();
        store.upsert_producer("p").await.unwrap();
        store.merge_publishes("p", "t", 3).await.unwrap();
        store.merge_publishes("p", "t", 8).await.unwrap();

        assert_eq!(store.count_relationships().await.unwrap(), 1);
        let activity = store.producer_activity(10).await.unwrap();
        assert_eq!(activity[0].messages, 8);
    }

    #[tokio::test]
    async fn merge_against_missing_node_reports_miss() {
        let store = InMemoryStore::new();
        store.upsert_topic("t", 0).await.unwrap();
        assert!(!store.merge_publishes("ghost", "t", 1).await.unwrap());
        assert!(!store.merge_subscribes("ghost", "t").await.unwrap());
        assert_eq!(store.count_relationships().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn producer_activity_skips_idle_producers() {
        let store = InMemoryStore::new();
        store.upsert_producer("idle").await.unwrap();
        assert!(store.producer_activity(10).await.unwrap().is_empty());
        assert_eq!(store.list_producers(100).await.unwrap().len(), 1);
    }
}
