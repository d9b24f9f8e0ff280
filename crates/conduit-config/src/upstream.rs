use serde::Deserialize;
use url::Url;

/// Upstream Anthropic backend configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL override (defaults to the public Anthropic API)
    #[serde(default)]
    pub base_url: Option<Url>,
}
