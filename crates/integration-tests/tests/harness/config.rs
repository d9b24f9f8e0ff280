//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::PathBuf;

use conduit_config::{Config, ModelsConfig, ServerConfig, UpstreamConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at the given mock backend
    ///
    /// The model mapping file points at a path that does not exist, so
    /// tests get deterministic mapping behavior unless they opt in.
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                upstream: UpstreamConfig {
                    base_url: Some(base_url.parse().expect("valid URL")),
                },
                models: ModelsConfig {
                    map_path: PathBuf::from("/nonexistent/model-map.json"),
                    ..ModelsConfig::default()
                },
                credentials: None,
            },
        }
    }

    /// Use a real model mapping file
    pub fn with_model_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.models.map_path = path.into();
        self
    }

    /// Disable the health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Finish building
    pub fn build(self) -> Config {
        self.config
    }
}
