use std::fs;
use std::path::Path;

/// Which graph engine the gateway talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Neo4j,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neo4j" => Ok(Backend::Neo4j),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Top-level gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub neo4j: Neo4jConfig,
    pub backend: Backend,
    /// Fail relationship merges against missing nodes with NotFound
    pub strict_relationships: bool,
}

/// HTTP listener settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Bolt connection settings
#[derive(Clone, Debug)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("STREAMGRAPH_HOST")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: std::env::var("STREAMGRAPH_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
        }
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: std::env::var("NEO4J_URI")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "neo4j://127.0.0.1:7687".to_string()),
            user: std::env::var("NEO4J_USER")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "neo4j".to_string()),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or_default(),
            database: std::env::var("NEO4J_DATABASE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "neo4j".to_string()),
            max_connections: std::env::var("NEO4J_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            neo4j: Neo4jConfig::default(),
            backend: std::env::var("STREAMGRAPH_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Backend::Neo4j),
            strict_relationships: std::env::var("STREAMGRAPH_STRICT_RELATIONSHIPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file (path via STREAMGRAPH_CONFIG or ./streamgraph.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path =
            std::env::var("STREAMGRAPH_CONFIG").unwrap_or_else(|_| "streamgraph.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        let default = Self::default();
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s, default),
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Overlay a TOML document onto `base`. Parse failures keep `base`.
    pub fn from_toml_str(s: &str, base: Self) -> Self {
        match toml::from_str::<GatewayToml>(s) {
            Ok(t) => t.overlay(base),
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                base
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GatewayToml {
    pub backend: Option<Backend>,
    pub strict_relationships: Option<bool>,
    pub server: Option<ServerToml>,
    pub neo4j: Option<Neo4jToml>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ServerToml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct Neo4jToml {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<usize>,
}

impl GatewayToml {
    fn overlay(self, mut base: GatewayConfig) -> GatewayConfig {
        if let Some(b) = self.backend {
            base.backend = b;
        }
        if let Some(s) = self.strict_relationships {
            base.strict_relationships = s;
        }
        if let Some(s) = self.server {
            s.apply(&mut base.server);
        }
        if let Some(n) = self.neo4j {
            n.apply(&mut base.neo4j);
        }
        base
    }
}

impl ServerToml {
    fn apply(self, cfg: &mut ServerConfig) {
        if let Some(v) = self.host {
            cfg.host = v;
        }
        if let Some(v) = self.port {
            cfg.port = v;
        }
    }
}

impl Neo4jToml {
    fn apply(self, cfg: &mut Neo4jConfig) {
        if let Some(v) = self.uri {
            cfg.uri = v;
        }
        if let Some(v) = self.user {
            cfg.user = v;
        }
        if let Some(v) = self.password {
            cfg.password = v;
        }
        if let Some(v) = self.database {
            cfg.database = v;
        }
        if let Some(v) = self.max_connections {
            cfg.max_connections = v.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GatewayConfig {
        GatewayConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 3001,
            },
            neo4j: Neo4jConfig {
                uri: "neo4j://127.0.0.1:7687".into(),
                user: "neo4j".into(),
                password: String::new(),
                database: "neo4j".into(),
                max_connections: 16,
            },
            backend: Backend::Neo4j,
            strict_relationships: true,
        }
    }

    #[test]
    fn toml_overlays_only_supplied_keys() {
        let cfg = GatewayConfig::from_toml_str(
            r#"
            backend = "memory"

            [server]
            port = 8080

            [neo4j]
            password = "secret"
            "#,
            base(),
        );
        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.neo4j.password, "secret");
        assert_eq!(cfg.neo4j.user, "neo4j");
        assert!(cfg.strict_relationships);
    }

    #[test]
    fn invalid_toml_keeps_base() {
        let cfg = GatewayConfig::from_toml_str("server = [", base());
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.backend, Backend::Neo4j);
    }

    #[test]
    fn zero_pool_size_is_clamped() {
        let cfg = GatewayConfig::from_toml_str("[neo4j]\nmax_connections = 0", base());
        assert_eq!(cfg.neo4j.max_connections, 1);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<Backend>().unwrap(), Backend::Memory);
        assert!("rocks".parse::<Backend>().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = GatewayConfig::load_from(Path::new("/nonexistent/streamgraph.toml"));
        assert!(cfg.neo4j.max_connections >= 1);
    }
}
