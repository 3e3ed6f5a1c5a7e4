//! Multi-query aggregates.
//!
//! Each aggregate issues its independent counts concurrently and joins on
//! completion. The first failing sub-query fails the whole aggregate; there
//! is no partial result.

use crate::model::{EntityCount, EntityKind, Stats};
use crate::store::GraphStore;
use crate::Result;

/// Topic, producer, consumer and relationship counts, fetched concurrently.
pub async fn stats(store: &dyn GraphStore) -> Result<Stats> {
    let (topics, producers, consumers, relations) = tokio::try_join!(
        store.count_nodes(EntityKind::Topic),
        store.count_nodes(EntityKind::Producer),
        store.count_nodes(EntityKind::Consumer),
        store.count_relationships(),
    )?;
    Ok(Stats::from_counts(topics, producers, consumers, relations))
}

/// Fixed three-bucket distribution of node kinds.
pub async fn entity_distribution(store: &dyn GraphStore) -> Result<Vec<EntityCount>> {
    let (topics, producers, consumers) = tokio::try_join!(
        store.count_nodes(EntityKind::Topic),
        store.count_nodes(EntityKind::Producer),
        store.count_nodes(EntityKind::Consumer),
    )?;
    Ok([
        (EntityKind::Topic, topics),
        (EntityKind::Producer, producers),
        (EntityKind::Consumer, consumers),
    ]
    .into_iter()
    .map(|(kind, count)| EntityCount {
        name: kind.bucket().to_string(),
        count,
    })
    .collect())
}
