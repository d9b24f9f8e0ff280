use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// Runs before deserialization so config structs hold plain values and
/// never re-resolve at read time. An optional fallback is written as
/// `{{ env.VAR | default("fallback") }}` and is used when the variable is
/// unset. Comment lines (leading `#`) pass through unexpanded, so a
/// commented-out setting never fails the load.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure: Option<String> = None;

    let expanded = placeholder_re().replace_all(line, |caps: &Captures<'_>| {
        let key = &caps[1];
        let fallback = caps.get(2).map(|m| m.as_str());

        match resolve_placeholder(key, fallback) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

/// Look up one placeholder key, honoring its `default("...")` fallback
fn resolve_placeholder(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let var_name = key
        .strip_prefix("env.")
        .filter(|rest| !rest.is_empty() && !rest.contains('.'))
        .ok_or_else(|| format!("only variables scoped with 'env.' are supported: `{key}`"))?;

    match std::env::var(var_name) {
        Ok(value) => Ok(value),
        Err(_) => fallback
            .map(str::to_owned)
            .ok_or_else(|| format!("environment variable not found: `{var_name}`")),
    }
}

fn placeholder_re() -> &'static Regex {
    // Group 1: the scoped key (e.g. `env.VAR_NAME`)
    // Group 2: optional fallback inside default("...")
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}
