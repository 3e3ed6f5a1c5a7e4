//! Gateway API client
//!
//! Thin reqwest wrapper over the `/api` endpoints. Non-2xx responses become
//! `ClientError::Gateway` carrying the gateway's `{error}` message.

use crate::config::DashboardConfig;
use crate::{ClientError, Result};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use streamgraph_core::model::{
    CreateConsumer, CreateProducer, CreateTopic, PublishLink, SubscribeLink, UpdateConsumer,
    UpdateProducer, UpdateTopic,
};
use streamgraph_core::{
    Ack, ConsumerSummary, EntityCount, EntityKind, ErrorBody, Health, ProducerActivity,
    ProducerSummary, Stats, TopicCount, TopicSummary,
};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct ApiService {
    base_url: String,
    http_client: reqwest::Client,
}

impl ApiService {
    pub fn new(config: &DashboardConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("streamgraph-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn entity_url(&self, kind: EntityKind, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            kind.collection(),
            urlencoding::encode(key)
        )
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        warn!(target: "dashboard", status = %status, error = %message, "Gateway returned error");
        Err(ClientError::Gateway {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(target: "dashboard", path = %path, "GET");
        let response = self.http_client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn send<B: Serialize>(&self, method: Method, url: String, body: &B) -> Result<Ack> {
        debug!(target: "dashboard", method = %method, url = %url, "Write request");
        let response = self
            .http_client
            .request(method, url)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    // =========================
    // Reads
    // =========================

    /// True when the gateway reports a healthy engine. Never fails.
    pub async fn check_health(&self) -> bool {
        match self.health().await {
            Ok(_) => true,
            Err(e) => {
                debug!(target: "dashboard", error = %e, "Health probe failed");
                false
            }
        }
    }

    pub async fn health(&self) -> Result<Health> {
        self.get("/health").await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.get("/stats").await
    }

    pub async fn topics(&self) -> Result<Vec<TopicSummary>> {
        self.get("/topics").await
    }

    pub async fn producers(&self) -> Result<Vec<ProducerSummary>> {
        self.get("/producers").await
    }

    pub async fn consumers(&self) -> Result<Vec<ConsumerSummary>> {
        self.get("/consumers").await
    }

    pub async fn topic_distribution(&self) -> Result<Vec<TopicCount>> {
        self.get("/charts/topic-distribution").await
    }

    pub async fn producer_activity(&self) -> Result<Vec<ProducerActivity>> {
        self.get("/charts/producer-activity").await
    }

    pub async fn entity_distribution(&self) -> Result<Vec<EntityCount>> {
        self.get("/charts/entity-distribution").await
    }

    // =========================
    // Writes
    // =========================

    pub async fn create_topic(&self, req: &CreateTopic) -> Result<Ack> {
        self.send(Method::POST, self.url("/topics"), req).await
    }

    pub async fn update_topic(&self, name: &str, req: &UpdateTopic) -> Result<Ack> {
        self.send(Method::PUT, self.entity_url(EntityKind::Topic, name), req)
            .await
    }

    pub async fn create_producer(&self, req: &CreateProducer) -> Result<Ack> {
        self.send(Method::POST, self.url("/producers"), req).await
    }

    pub async fn update_producer(&self, id: &str, req: &UpdateProducer) -> Result<Ack> {
        self.send(Method::PUT, self.entity_url(EntityKind::Producer, id), req)
            .await
    }

    pub async fn create_consumer(&self, req: &CreateConsumer) -> Result<Ack> {
        self.send(Method::POST, self.url("/consumers"), req).await
    }

    pub async fn update_consumer(&self, id: &str, req: &UpdateConsumer) -> Result<Ack> {
        self.send(Method::PUT, self.entity_url(EntityKind::Consumer, id), req)
            .await
    }

    pub async fn delete(&self, kind: EntityKind, key: &str) -> Result<Ack> {
        let url = self.entity_url(kind, key);
        debug!(target: "dashboard", url = %url, "DELETE");
        let response = self.http_client.delete(url).send().await?;
        Self::decode(response).await
    }

    pub async fn link_publisher(&self, req: &PublishLink) -> Result<Ack> {
        self.send(Method::POST, self.url("/relationships/publishes"), req)
            .await
    }

    pub async fn link_subscriber(&self, req: &SubscribeLink) -> Result<Ack> {
        self.send(Method::POST, self.url("/relationships/subscribes"), req)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_percent_encoded() {
        let api = ApiService::new(&DashboardConfig::default());
        assert_eq!(
            api.entity_url(EntityKind::Topic, "user events/eu"),
            "http://localhost:3001/api/topics/user%20events%2Feu"
        );
        assert_eq!(
            api.entity_url(EntityKind::Consumer, "c-1"),
            "http://localhost:3001/api/consumers/c-1"
        );
    }
}
