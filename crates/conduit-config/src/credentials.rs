use std::path::PathBuf;

use serde::Deserialize;

/// Managed credential store configuration
///
/// Points at a JSON file holding an already-provisioned OAuth token pair.
/// Obtaining the initial token is outside the gateway; this only covers
/// where the token lives and when it is considered stale.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Path to the persisted OAuth credential file
    pub path: PathBuf,
    /// Seconds before expiry at which a refresh is triggered
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_secs: u64,
}

const fn default_refresh_margin() -> u64 {
    60
}
