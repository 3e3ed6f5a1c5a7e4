// Neo4j-backed graph store
//
// Wraps a neo4rs `Graph`, which owns a bounded Bolt connection pool. Each
// statement checks a connection out of the pool and hands it back when the
// row stream is dropped, so no connection outlives the request that used it.

use crate::config::Neo4jConfig;
use crate::model::{
    ConsumerPatch, ConsumerSummary, EntityKind, ProducerActivity, ProducerPatch, ProducerSummary,
    TopicCount, TopicPatch, TopicSummary,
};
use crate::numeric::{count_column, text_column};
use crate::store::{cypher, GraphStore};
use crate::{GraphError, Result};
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row};
use tracing::{debug, info};

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Open a connection pool using the given settings
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let neo_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .build()?;

        let graph = Graph::connect(neo_config).await?;
        info!(
            target: "store",
            uri = %config.uri,
            database = %config.database,
            max_connections = config.max_connections,
            "Neo4j pool created"
        );
        Ok(Self { graph })
    }

    /// Wrap an already connected graph handle
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn single_count(&self, q: Query, column: &str) -> Result<u64> {
        let rows = self.rows(q).await?;
        Ok(rows.first().map(|r| count_column(r, column)).unwrap_or(0))
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn count_param(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn required_text(row: &Row, column: &str) -> Result<String> {
    text_column(row, column)
        .ok_or_else(|| GraphError::Engine(format!("row is missing column '{}'", column)))
}

#[async_trait]
impl GraphStore for Neo4jStore {
    fn engine(&self) -> &'static str {
        "neo4j"
    }

    async fn ping(&self) -> Result<()> {
        self.graph.run(query(cypher::PING)).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        for stmt in cypher::SCHEMA {
            self.graph.run(query(stmt)).await?;
        }
        info!(target: "store", "Neo4j schema initialized (identity constraints ensured)");
        Ok(())
    }

    async fn list_topics(&self, limit: usize) -> Result<Vec<TopicSummary>> {
        let rows = self
            .rows(query(cypher::LIST_TOPICS).param("limit", limit_param(limit)))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(TopicSummary {
                    name: required_text(row, "name")?,
                    message_count: count_column(row, "messageCount"),
                    producer_count: count_column(row, "producerCount"),
                    status: "active".to_string(),
                })
            })
            .collect()
    }

    async fn list_producers(&self, limit: usize) -> Result<Vec<ProducerSummary>> {
        let rows = self
            .rows(query(cypher::LIST_PRODUCERS).param("limit", limit_param(limit)))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(ProducerSummary {
                    id: required_text(row, "id")?,
                    topic_count: count_column(row, "topicCount"),
                    message_count: count_column(row, "messageCount"),
                    last_seen: text_column(row, "lastSeen"),
                })
            })
            .collect()
    }

    async fn list_consumers(&self, limit: usize) -> Result<Vec<ConsumerSummary>> {
        let rows = self
            .rows(query(cypher::LIST_CONSUMERS).param("limit", limit_param(limit)))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(ConsumerSummary {
                    id: required_text(row, "id")?,
                    topic_count: count_column(row, "topicCount"),
                    last_seen: text_column(row, "lastSeen"),
                })
            })
            .collect()
    }

    async fn count_nodes(&self, kind: EntityKind) -> Result<u64> {
        self.single_count(query(cypher::count_nodes(kind)), "count")
            .await
    }

    async fn count_relationships(&self) -> Result<u64> {
        self.single_count(query(cypher::COUNT_RELATIONSHIPS), "count")
            .await
    }

    async fn topic_distribution(&self, limit: usize) -> Result<Vec<TopicCount>> {
        let rows = self
            .rows(query(cypher::TOPIC_DISTRIBUTION).param("limit", limit_param(limit)))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(TopicCount {
                    name: required_text(row, "name")?,
                    count: count_column(row, "count"),
                })
            })
            .collect()
    }

    async fn producer_activity(&self, limit: usize) -> Result<Vec<ProducerActivity>> {
        let rows = self
            .rows(query(cypher::PRODUCER_ACTIVITY).param("limit", limit_param(limit)))
            .await?;
        rows.iter()
            .map(|row| {
                Ok(ProducerActivity {
                    id: required_text(row, "id")?,
                    topics: count_column(row, "topics"),
                    messages: count_column(row, "messages"),
                })
            })
            .collect()
    }

    async fn upsert_topic(&self, name: &str, message_count: u64) -> Result<()> {
        let q = query(cypher::UPSERT_TOPIC)
            .param("name", name)
            .param("messageCount", count_param(message_count));
        self.graph.run(q).await?;
        debug!(target: "store", name = %name, "Topic upserted");
        Ok(())
    }

    async fn update_topic(&self, name: &str, patch: &TopicPatch) -> Result<bool> {
        let mut q = query(cypher::update_topic(patch)).param("name", name);
        if let Some(new_name) = &patch.new_name {
            q = q.param("newName", new_name.as_str());
        }
        if let Some(count) = patch.message_count {
            q = q.param("messageCount", count_param(count));
        }
        Ok(!self.rows(q).await?.is_empty())
    }

    async fn upsert_producer(&self, id: &str) -> Result<()> {
        self.graph
            .run(query(cypher::UPSERT_PRODUCER).param("id", id))
            .await?;
        debug!(target: "store", id = %id, "Producer upserted");
        Ok(())
    }

    async fn update_producer(&self, id: &str, patch: &ProducerPatch) -> Result<bool> {
        let mut q = query(cypher::update_producer(patch)).param("id", id);
        if let Some(new_id) = &patch.new_id {
            q = q.param("newId", new_id.as_str());
        }
        Ok(!self.rows(q).await?.is_empty())
    }

    async fn upsert_consumer(&self, id: &str, group: Option<String>) -> Result<()> {
        let mut q = query(cypher::upsert_consumer(group.as_deref())).param("id", id);
        if let Some(group) = group {
            q = q.param("group", group);
        }
        self.graph.run(q).await?;
        debug!(target: "store", id = %id, "Consumer upserted");
        Ok(())
    }

    async fn update_consumer(&self, id: &str, patch: &ConsumerPatch) -> Result<bool> {
        let mut q = query(cypher::update_consumer(patch)).param("id", id);
        if let Some(new_id) = &patch.new_id {
            q = q.param("newId", new_id.as_str());
        }
        if let Some(group) = &patch.group {
            q = q.param("group", group.as_str());
        }
        Ok(!self.rows(q).await?.is_empty())
    }

    async fn delete_node(&self, kind: EntityKind, key: &str) -> Result<u64> {
        self.single_count(query(cypher::delete_node(kind)).param("key", key), "deleted")
            .await
    }

    async fn merge_publishes(
        &self,
        producer_id: &str,
        topic_name: &str,
        message_count: u64,
    ) -> Result<bool> {
        let q = query(cypher::MERGE_PUBLISHES)
            .param("producerId", producer_id)
            .param("topicName", topic_name)
            .param("messageCount", count_param(message_count));
        Ok(self.single_count(q, "linked").await? > 0)
    }

    async fn merge_subscribes(&self, consumer_id: &str, topic_name: &str) -> Result<bool> {
        let q = query(cypher::MERGE_SUBSCRIBES)
            .param("consumerId", consumer_id)
            .param("topicName", topic_name);
        Ok(self.single_count(q, "linked").await? > 0)
    }
}
