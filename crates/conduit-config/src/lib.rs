#![allow(clippy::must_use_candidate)]

//! Configuration for the Conduit gateway
//!
//! Loaded from a TOML file with `{{ env.VAR }}` expansion. Model-mapping
//! state is re-read from its sources per call via [`ModelsConfig::snapshot`],
//! so edits to the mapping file become visible without a restart.

pub mod credentials;
mod env;
mod loader;
pub mod models;
pub mod server;
pub mod upstream;

use serde::Deserialize;

pub use credentials::CredentialsConfig;
pub use models::{ModelMapping, ModelsConfig};
pub use server::{HealthConfig, ServerConfig};
pub use upstream::UpstreamConfig;

/// Top-level Conduit configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream Anthropic backend configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Model mapping configuration
    #[serde(default)]
    pub models: ModelsConfig,
    /// Managed credential store configuration
    #[serde(default)]
    pub credentials: Option<CredentialsConfig>,
}
