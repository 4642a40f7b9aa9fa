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

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the relay or server sections hold unusable values
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_relay_config()?;
        self.validate_server_config()?;
        Ok(())
    }

    fn validate_relay_config(&self) -> anyhow::Result<()> {
        let relay = &self.relay;

        if relay.timeout_duration()?.is_zero() {
            anyhow::bail!("relay.timeout must be greater than zero");
        }

        if relay.body_limit == 0 {
            anyhow::bail!("relay.body_limit must be greater than 0");
        }

        for name in &relay.forward_headers {
            http::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow::anyhow!("invalid header name '{name}' in relay.forward_headers: {e}"))?;
        }

        for (section, url) in [
            ("relay.elevenlabs.base_url", &relay.elevenlabs.base_url),
            ("relay.google.base_url", &relay.google.base_url),
        ] {
            if url.cannot_be_a_base() {
                anyhow::bail!("{section} must be a hierarchical URL, got '{url}'");
            }
        }

        Ok(())
    }

    fn validate_server_config(&self) -> anyhow::Result<()> {
        let server = &self.server;

        for (section, path) in [("server.health.path", &server.health.path), ("server.echo.path", &server.echo.path)] {
            if !path.starts_with('/') {
                anyhow::bail!("{section} must start with '/', got '{path}'");
            }
        }

        if server.health.enabled && server.echo.enabled && server.health.path == server.echo.path {
            anyhow::bail!("server.health.path and server.echo.path must differ");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, LogFormat};

    #[test]
    fn empty_file_is_a_valid_config() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.server.listen_address_or_default().port(), 8080);
        assert!(config.server.health.enabled);
        assert_eq!(config.server.echo.path, "/test");
        assert!(config.server.cors.enabled);
        assert_eq!(config.telemetry.log_format, LogFormat::Text);
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_address = "127.0.0.1:3001"

            [server.echo]
            enabled = false

            [relay]
            timeout = "45s"

            [relay.google]
            base_url = "http://127.0.0.1:9100/v1"

            [telemetry]
            log_filter = "voxrelay=debug"
            log_format = "json"
        "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_address_or_default().port(), 3001);
        assert!(!config.server.echo.enabled);
        assert_eq!(config.relay.google.base_url.as_str(), "http://127.0.0.1:9100/v1");
        assert_eq!(config.telemetry.log_filter, "voxrelay=debug");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn expands_environment_before_parsing() {
        temp_env::with_var("VOXRELAY_TEST_LISTEN", Some("127.0.0.1:4000"), || {
            let config = Config::from_toml("[server]\nlisten_address = \"{{ env.VOXRELAY_TEST_LISTEN }}\"\n").unwrap();
            assert_eq!(config.server.listen_address_or_default().port(), 4000);
        });
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::from_toml("[relay]\ntimeout = \"0s\"\n").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn rejects_invalid_forward_header() {
        let err = Config::from_toml("[relay]\nforward_headers = [\"bad header\"]\n").unwrap_err();
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn rejects_colliding_paths() {
        let err = Config::from_toml("[server.echo]\npath = \"/health\"\n").unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_relative_paths() {
        let err = Config::from_toml("[server.health]\npath = \"health\"\n").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }
}
