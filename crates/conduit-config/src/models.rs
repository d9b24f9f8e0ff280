use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable that forces a single native model for every call
pub const MODEL_OVERRIDE_VAR: &str = "CONDUIT_FORCE_MODEL";

/// Model mapping configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    /// Path to the JSON mapping file (requested name -> native name)
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
    /// Native model selected when no other rule matches
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Native model selected for low-tier requested names
    #[serde(default = "default_low_tier_model")]
    pub low_tier_model: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
            default_model: default_model(),
            low_tier_model: default_low_tier_model(),
        }
    }
}

impl ModelsConfig {
    /// Build an immutable per-call mapping snapshot
    ///
    /// Re-reads the mapping file and the override variable on every call,
    /// so edits become visible without a restart. A missing mapping file is
    /// normal; a malformed one is logged and treated as empty, never fatal.
    pub fn snapshot(&self) -> ModelMapping {
        let overrides = match std::fs::read_to_string(&self.map_path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %self.map_path.display(),
                        error = %e,
                        "malformed model mapping file, ignoring"
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        let forced = std::env::var(MODEL_OVERRIDE_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty());

        ModelMapping {
            overrides,
            forced,
            default_model: self.default_model.clone(),
            low_tier_model: self.low_tier_model.clone(),
        }
    }
}

/// Immutable per-call view of the model mapping state
///
/// Built once per call and injected into the mapper, so tests can supply a
/// deterministic mapping without touching the filesystem or the process
/// environment.
#[derive(Debug, Clone)]
pub struct ModelMapping {
    /// Exact-name overrides from the mapping file
    pub overrides: HashMap<String, String>,
    /// Globally forced native model from the environment
    pub forced: Option<String>,
    /// Native model when no rule matches
    pub default_model: String,
    /// Native model for low-tier requested names
    pub low_tier_model: String,
}

impl ModelMapping {
    /// A snapshot with no overrides, using the built-in model defaults
    pub fn with_defaults() -> Self {
        Self {
            overrides: HashMap::new(),
            forced: None,
            default_model: default_model(),
            low_tier_model: default_low_tier_model(),
        }
    }
}

fn default_map_path() -> PathBuf {
    PathBuf::from("model-map.json")
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_owned()
}

fn default_low_tier_model() -> String {
    "claude-3-5-haiku-20241022".to_owned()
}
