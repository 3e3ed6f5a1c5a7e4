// Gateway HTTP API
//
// REST endpoints under /api mapped one-to-one onto GraphService operations.

use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use streamgraph_core::model::{
    CreateConsumer, CreateProducer, CreateTopic, PublishLink, SubscribeLink, UpdateConsumer,
    UpdateProducer, UpdateTopic,
};
use streamgraph_core::{
    Ack, ConsumerSummary, EntityCount, GraphService, Health, ProducerActivity, ProducerSummary,
    Stats, TopicCount, TopicSummary,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Build the /api router around a graph service
pub fn router(service: GraphService) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/topics", get(list_topics).post(create_topic))
        .route("/topics/:name", put(update_topic).delete(delete_topic))
        .route("/producers", get(list_producers).post(create_producer))
        .route("/producers/:id", put(update_producer).delete(delete_producer))
        .route("/consumers", get(list_consumers).post(create_consumer))
        .route("/consumers/:id", put(update_consumer).delete(delete_consumer))
        .route("/charts/topic-distribution", get(topic_distribution))
        .route("/charts/producer-activity", get(producer_activity))
        .route("/charts/entity-distribution", get(entity_distribution))
        .route("/relationships/publishes", post(link_publisher))
        .route("/relationships/subscribes", post(link_subscriber));

    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Log a failed operation before it becomes a response
fn logged<T>(op: &str, result: streamgraph_core::Result<T>) -> ApiResult<T> {
    result.map_err(|e| {
        error!(target: "gateway", op = %op, error = %e, "Request failed");
        ApiError::from(e)
    })
}

fn body<T>(op: &str, payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        error!(target: "gateway", op = %op, error = %rejection, "Rejected request body");
        ApiError::from(rejection)
    })
}

fn identity(op: &str, path: Result<Path<String>, PathRejection>) -> ApiResult<String> {
    path.map(|Path(v)| v).map_err(|rejection| {
        error!(target: "gateway", op = %op, error = %rejection, "Rejected request path");
        ApiError::from(rejection)
    })
}

// =========================
// Reads
// =========================

async fn health_handler(State(service): State<GraphService>) -> Response {
    match service.health().await {
        Ok(()) => Json(Health {
            status: "healthy".into(),
            engine: "connected".into(),
        })
        .into_response(),
        Err(e) => {
            error!(target: "gateway", error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn stats_handler(State(service): State<GraphService>) -> ApiResult<Json<Stats>> {
    logged("stats", service.stats().await).map(Json)
}

async fn list_topics(State(service): State<GraphService>) -> ApiResult<Json<Vec<TopicSummary>>> {
    logged("list topics", service.topics().await).map(Json)
}

async fn list_producers(
    State(service): State<GraphService>,
) -> ApiResult<Json<Vec<ProducerSummary>>> {
    logged("list producers", service.producers().await).map(Json)
}

async fn list_consumers(
    State(service): State<GraphService>,
) -> ApiResult<Json<Vec<ConsumerSummary>>> {
    logged("list consumers", service.consumers().await).map(Json)
}

async fn topic_distribution(
    State(service): State<GraphService>,
) -> ApiResult<Json<Vec<TopicCount>>> {
    logged("topic distribution", service.topic_distribution().await).map(Json)
}

async fn producer_activity(
    State(service): State<GraphService>,
) -> ApiResult<Json<Vec<ProducerActivity>>> {
    logged("producer activity", service.producer_activity().await).map(Json)
}

async fn entity_distribution(
    State(service): State<GraphService>,
) -> ApiResult<Json<Vec<EntityCount>>> {
    logged("entity distribution", service.entity_distribution().await).map(Json)
}

// =========================
// Topics
// =========================

async fn create_topic(
    State(service): State<GraphService>,
    payload: Result<Json<CreateTopic>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let req = body("create topic", payload)?;
    logged("create topic", service.create_topic(req).await).map(Json)
}

async fn update_topic(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTopic>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let name = identity("update topic", path)?;
    let req = body("update topic", payload)?;
    logged("update topic", service.update_topic(&name, req).await).map(Json)
}

async fn delete_topic(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Ack>> {
    let name = identity("delete topic", path)?;
    logged("delete topic", service.delete_topic(&name).await).map(Json)
}

// =========================
// Producers
// =========================

async fn create_producer(
    State(service): State<GraphService>,
    payload: Result<Json<CreateProducer>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let req = body("create producer", payload)?;
    logged("create producer", service.create_producer(req).await).map(Json)
}

async fn update_producer(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateProducer>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let id = identity("update producer", path)?;
    let req = body("update producer", payload)?;
    logged("update producer", service.update_producer(&id, req).await).map(Json)
}

async fn delete_producer(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Ack>> {
    let id = identity("delete producer", path)?;
    logged("delete producer", service.delete_producer(&id).await).map(Json)
}

// =========================
// Consumers
// =========================

async fn create_consumer(
    State(service): State<GraphService>,
    payload: Result<Json<CreateConsumer>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let req = body("create consumer", payload)?;
    logged("create consumer", service.create_consumer(req).await).map(Json)
}

async fn update_consumer(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateConsumer>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let id = identity("update consumer", path)?;
    let req = body("update consumer", payload)?;
    logged("update consumer", service.update_consumer(&id, req).await).map(Json)
}

async fn delete_consumer(
    State(service): State<GraphService>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Ack>> {
    let id = identity("delete consumer", path)?;
    logged("delete consumer", service.delete_consumer(&id).await).map(Json)
}

// =========================
// Relationships
// =========================

async fn link_publisher(
    State(service): State<GraphService>,
    payload: Result<Json<PublishLink>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let req = body("link publisher", payload)?;
    logged("link publisher", service.link_publisher(req).await).map(Json)
}

async fn link_subscriber(
    State(service): State<GraphService>,
    payload: Result<Json<SubscribeLink>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let req = body("link subscriber", payload)?;
    logged("link subscriber", service.link_subscriber(req).await).map(Json)
}
