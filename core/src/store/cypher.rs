//! Cypher statements used by the Neo4j store.
//!
//! Every statement is a constant with `$` parameters. Optional update fields
//! pick one of a fixed set of variants; query text is never assembled from
//! request data.

use crate::model::{ConsumerPatch, EntityKind, ProducerPatch, TopicPatch};

pub const PING: &str = "RETURN 1 AS ok";

pub const SCHEMA: [&str; 3] = [
    "CREATE CONSTRAINT topic_name_unique IF NOT EXISTS
     FOR (t:Topic) REQUIRE t.name IS UNIQUE",
    "CREATE CONSTRAINT producer_id_unique IF NOT EXISTS
     FOR (p:Producer) REQUIRE p.id IS UNIQUE",
    "CREATE CONSTRAINT consumer_id_unique IF NOT EXISTS
     FOR (c:Consumer) REQUIRE c.id IS UNIQUE",
];

// =========================
// Reads
// =========================

pub const LIST_TOPICS: &str = "
    MATCH (t:Topic)
    OPTIONAL MATCH (p:Producer)-[:PUBLISHES_TO]->(t)
    RETURN t.name AS name,
           COALESCE(t.messageCount, 0) AS messageCount,
           COUNT(DISTINCT p) AS producerCount
    ORDER BY messageCount DESC
    LIMIT $limit";

pub const LIST_PRODUCERS: &str = "
    MATCH (p:Producer)
    OPTIONAL MATCH (p)-[r:PUBLISHES_TO]->(t:Topic)
    RETURN p.id AS id,
           COUNT(DISTINCT t) AS topicCount,
           COALESCE(SUM(r.messageCount), 0) AS messageCount,
           toString(p.lastSeen) AS lastSeen
    ORDER BY messageCount DESC
    LIMIT $limit";

pub const LIST_CONSUMERS: &str = "
    MATCH (c:Consumer)
    OPTIONAL MATCH (c)-[:SUBSCRIBES_TO]->(t:Topic)
    RETURN c.id AS id,
           COUNT(DISTINCT t) AS topicCount,
           toString(c.lastSeen) AS lastSeen
    ORDER BY topicCount DESC
    LIMIT $limit";

pub const TOPIC_DISTRIBUTION: &str = "
    MATCH (t:Topic)
    RETURN t.name AS name, COALESCE(t.messageCount, 0) AS count
    ORDER BY count DESC
    LIMIT $limit";

pub const PRODUCER_ACTIVITY: &str = "
    MATCH (p:Producer)-[r:PUBLISHES_TO]->(t:Topic)
    RETURN p.id AS id,
           COUNT(DISTINCT t) AS topics,
           COALESCE(SUM(r.messageCount), 0) AS messages
    ORDER BY messages DESC
    LIMIT $limit";

pub const COUNT_RELATIONSHIPS: &str = "MATCH ()-[r]->() RETURN COUNT(r) AS count";

pub fn count_nodes(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Topic => "MATCH (n:Topic) RETURN COUNT(n) AS count",
        EntityKind::Producer => "MATCH (n:Producer) RETURN COUNT(n) AS count",
        EntityKind::Consumer => "MATCH (n:Consumer) RETURN COUNT(n) AS count",
    }
}

// =========================
// Writes
// =========================

pub const UPSERT_TOPIC: &str = "
    MERGE (t:Topic {name: $name})
    SET t.messageCount = $messageCount, t.lastUpdated = datetime()";

pub const UPSERT_PRODUCER: &str = "
    MERGE (p:Producer {id: $id})
    SET p.lastSeen = datetime()";

pub const UPSERT_CONSUMER: &str = "
    MERGE (c:Consumer {id: $id})
    SET c.lastSeen = datetime(), c.group = $group";

pub const UPSERT_CONSUMER_NO_GROUP: &str = "
    MERGE (c:Consumer {id: $id})
    SET c.lastSeen = datetime(), c.group = null";

pub fn upsert_consumer(group: Option<&str>) -> &'static str {
    match group {
        Some(_) => UPSERT_CONSUMER,
        None => UPSERT_CONSUMER_NO_GROUP,
    }
}

pub fn update_topic(patch: &TopicPatch) -> &'static str {
    match (patch.new_name.is_some(), patch.message_count.is_some()) {
        (false, false) => {
            "MATCH (t:Topic {name: $name})
             SET t.lastUpdated = datetime()
             RETURN t.name AS name"
        }
        (true, false) => {
            "MATCH (t:Topic {name: $name})
             SET t.lastUpdated = datetime(), t.name = $newName
             RETURN t.name AS name"
        }
        (false, true) => {
            "MATCH (t:Topic {name: $name})
             SET t.lastUpdated = datetime(), t.messageCount = $messageCount
             RETURN t.name AS name"
        }
        (true, true) => {
            "MATCH (t:Topic {name: $name})
             SET t.lastUpdated = datetime(), t.name = $newName, t.messageCount = $messageCount
             RETURN t.name AS name"
        }
    }
}

pub fn update_producer(patch: &ProducerPatch) -> &'static str {
    if patch.new_id.is_some() {
        "MATCH (p:Producer {id: $id})
         SET p.lastSeen = datetime(), p.id = $newId
         RETURN p.id AS id"
    } else {
        "MATCH (p:Producer {id: $id})
         SET p.lastSeen = datetime()
         RETURN p.id AS id"
    }
}

pub fn update_consumer(patch: &ConsumerPatch) -> &'static str {
    match (patch.new_id.is_some(), patch.group.is_some()) {
        (false, false) => {
            "MATCH (c:Consumer {id: $id})
             SET c.lastSeen = datetime()
             RETURN c.id AS id"
        }
        (true, false) => {
            "MATCH (c:Consumer {id: $id})
             SET c.lastSeen = datetime(), c.id = $newId
             RETURN c.id AS id"
        }
        (false, true) => {
            "MATCH (c:Consumer {id: $id})
             SET c.lastSeen = datetime(), c.group = $group
             RETURN c.id AS id"
        }
        (true, true) => {
            "MATCH (c:Consumer {id: $id})
             SET c.lastSeen = datetime(), c.id = $newId, c.group = $group
             RETURN c.id AS id"
        }
    }
}

pub fn delete_node(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Topic => {
            "MATCH (n:Topic {name: $key})
             DETACH DELETE n
             RETURN count(*) AS deleted"
        }
        EntityKind::Producer => {
            "MATCH (n:Producer {id: $key})
             DETACH DELETE n
             RETURN count(*) AS deleted"
        }
        EntityKind::Consumer => {
            "MATCH (n:Consumer {id: $key})
             DETACH DELETE n
             RETURN count(*) AS deleted"
        }
    }
}

pub const MERGE_PUBLISHES: &str = "
    MATCH (p:Producer {id: $producerId})
    MATCH (t:Topic {name: $topicName})
    MERGE (p)-[r:PUBLISHES_TO]->(t)
    SET r.messageCount = $messageCount, r.lastUpdated = datetime()
    RETURN count(r) AS linked";

pub const MERGE_SUBSCRIBES: &str = "
    MATCH (c:Consumer {id: $consumerId})
    MATCH (t:Topic {name: $topicName})
    MERGE (c)-[r:SUBSCRIBES_TO]->(t)
    SET r.lastUpdated = datetime()
    RETURN count(r) AS linked";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_variants_only_mention_supplied_fields() {
        let touch = update_topic(&TopicPatch::default());
        assert!(!touch.contains("$newName"));
        assert!(!touch.contains("$messageCount"));

        let rename = update_topic(&TopicPatch {
            new_name: Some("b".into()),
            message_count: None,
        });
        assert!(rename.contains("$newName"));
        assert!(!rename.contains("$messageCount"));

        let both = update_topic(&TopicPatch {
            new_name: Some("b".into()),
            message_count: Some(3),
        });
        assert!(both.contains("$newName") && both.contains("$messageCount"));
    }

    #[test]
    fn consumer_variants_cover_group() {
        let group_only = update_consumer(&ConsumerPatch {
            new_id: None,
            group: Some("g".into()),
        });
        assert!(group_only.contains("$group"));
        assert!(!group_only.contains("$newId"));
    }

    #[test]
    fn consumer_create_without_group_clears_it() {
        assert!(upsert_consumer(None).contains("c.group = null"));
        assert!(upsert_consumer(Some("g")).contains("$group"));
    }

    #[test]
    fn every_update_refreshes_timestamp() {
        for stmt in [
            update_topic(&TopicPatch::default()),
            update_producer(&ProducerPatch::default()),
            update_consumer(&ConsumerPatch::default()),
        ] {
            assert!(stmt.contains("datetime()"));
        }
    }
}
