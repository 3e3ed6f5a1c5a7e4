// Streamgraph Gateway
//
// HTTP server translating REST CRUD calls into graph store operations.

mod api;
mod error;

pub use api::router;
pub use error::{ApiError, ApiResult};

use std::sync::Arc;
use streamgraph_core::{Backend, GatewayConfig, GraphService, GraphStore, InMemoryStore, Neo4jStore};
use tracing::info;

/// Gateway HTTP server
pub struct GatewayServer {
    config: GatewayConfig,
    service: GraphService,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, service: GraphService) -> Self {
        Self { config, service }
    }

    /// Connect the configured backend and prepare its schema
    pub async fn connect(config: GatewayConfig) -> streamgraph_core::Result<Self> {
        let store: Arc<dyn GraphStore> = match config.backend {
            Backend::Neo4j => Arc::new(Neo4jStore::connect(&config.neo4j).await?),
            Backend::Memory => Arc::new(InMemoryStore::new()),
        };
        store.ensure_schema().await?;
        info!(
            target: "gateway",
            engine = store.engine(),
            strict_relationships = config.strict_relationships,
            "Graph store ready"
        );

        let service =
            GraphService::new(store).with_strict_relationships(config.strict_relationships);
        Ok(Self::new(config, service))
    }

    /// Serve until Ctrl-C / SIGTERM
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            target: "gateway",
            url = %format!("http://{}/api", addr),
            "Gateway server ready"
        );
        serve_on(listener, self.service, shutdown_signal()).await
    }
}

/// Serve the API on an already bound listener until `shutdown` resolves
pub async fn serve_on<F>(
    listener: tokio::net::TcpListener,
    service: GraphService,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(target: "gateway", "Gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(target: "gateway", error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(target: "gateway", error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target: "gateway", "Shutting down...");
}
