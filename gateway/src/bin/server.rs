use streamgraph_core::GatewayConfig;
use streamgraph_gateway::GatewayServer;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();
    fmt()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::load();
    tracing::info!(
        backend = ?config.backend,
        addr = %config.bind_addr(),
        neo4j = %config.neo4j.uri,
        database = %config.neo4j.database,
        "Starting Streamgraph gateway"
    );

    let server = GatewayServer::connect(config).await?;
    server.serve().await
}
