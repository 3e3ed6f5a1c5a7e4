// Streamgraph Core Library
// Topic/producer/consumer graph model, graph stores and the service layer
// shared by the gateway and the dashboard client.

pub mod aggregate;
pub mod config;
pub mod model;
pub mod numeric;
pub mod service;
pub mod store;

// Export core types
pub use config::{Backend, GatewayConfig, Neo4jConfig, ServerConfig};
pub use model::{
    Ack, ConsumerSummary, EntityCount, EntityKind, ErrorBody, Health, ProducerActivity,
    ProducerSummary, Stats, TopicCount, TopicSummary,
};
pub use service::GraphService;
pub use store::{GraphStore, InMemoryStore, Neo4jStore};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Engine(String),
}

impl From<neo4rs::Error> for GraphError {
    fn from(e: neo4rs::Error) -> Self {
        GraphError::Engine(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
