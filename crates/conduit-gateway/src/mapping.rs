//! Model identifier mapping: foreign model name to native model name

use conduit_config::ModelMapping;

/// Lower-cased substrings that classify a requested name as low tier
///
/// Checked in order against the lower-cased foreign name. The list is
/// fixed; routing flexibility belongs in the mapping file.
const LOW_TIER_MARKERS: &[&str] = &["3.5-turbo", "mini", "nano", "haiku", "instant", "lite"];

/// Resolve a requested foreign model name to a native model name
///
/// Resolution order, first match wins:
/// 1. exact key in the mapping-file override table
/// 2. the forced model from the environment override
/// 3. low-tier marker classification, else the default model
///
/// Total function: always returns a model, deterministic for a fixed
/// snapshot.
#[must_use]
pub fn resolve(requested: &str, mapping: &ModelMapping) -> String {
    if let Some(native) = mapping.overrides.get(requested) {
        return native.clone();
    }

    if let Some(forced) = &mapping.forced {
        return forced.clone();
    }

    let lowered = requested.to_lowercase();
    if LOW_TIER_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        mapping.low_tier_model.clone()
    } else {
        mapping.default_model.clone()
    }
}
