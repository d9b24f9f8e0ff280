use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a model name is blank or the credential
    /// configuration is unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.models.default_model.trim().is_empty() {
            anyhow::bail!("models.default_model must not be empty");
        }
        if self.models.low_tier_model.trim().is_empty() {
            anyhow::bail!("models.low_tier_model must not be empty");
        }

        if let Some(ref credentials) = self.credentials {
            if credentials.path.as_os_str().is_empty() {
                anyhow::bail!("credentials.path must not be empty");
            }
            if credentials.refresh_margin_secs == 0 {
                anyhow::bail!("credentials.refresh_margin_secs must be greater than 0");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn minimal_config_loads_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.server.listen_address.is_none());
        assert!(config.server.health.enabled);
        assert_eq!(config.server.health.path, "/health");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[surprise]\nkey = 1").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn blank_default_model_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[models]\ndefault_model = \" \"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("default_model"));
    }

    #[test]
    fn zero_refresh_margin_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[credentials]\npath = \"creds.json\"\nrefresh_margin_secs = 0"
        )
        .unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("refresh_margin_secs"));
    }
}
