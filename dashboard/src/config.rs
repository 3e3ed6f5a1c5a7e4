// Dashboard client configuration

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Dashboard configuration
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Gateway base URL including the `/api` prefix
    pub base_url: String,
    /// Health probe + refresh period
    pub poll_interval: Duration,
    /// Message log append period
    pub stream_interval: Duration,
    /// Counter animation frame period
    pub frame_interval: Duration,
    /// Maximum entries kept in the message log
    pub log_capacity: usize,
    /// Lifetime of a notification
    pub notification_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(10),
            stream_interval: Duration::from_secs(2),
            frame_interval: Duration::from_millis(16),
            log_capacity: 15,
            notification_ttl: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("STREAMGRAPH_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            poll_interval: env_secs("STREAMGRAPH_POLL_SECS").unwrap_or(defaults.poll_interval),
            stream_interval: env_secs("STREAMGRAPH_STREAM_SECS")
                .unwrap_or(defaults.stream_interval),
            request_timeout: env_secs("STREAMGRAPH_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
            ..defaults
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, "http://localhost:3001/api");
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.stream_interval, Duration::from_secs(2));
        assert_eq!(config.log_capacity, 15);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = DashboardConfig::default().with_base_url("http://gw:8080/api/");
        assert_eq!(config.base_url, "http://gw:8080/api");
    }
}
