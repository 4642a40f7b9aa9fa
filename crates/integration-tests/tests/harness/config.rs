//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use voxrelay_config::{Config, CorsConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults bound to localhost
    ///
    /// Provider URLs point at a reserved, unresolvable host so that a test
    /// which forgets to configure a mock fails instead of reaching the internet.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.relay.elevenlabs.base_url = "http://elevenlabs.invalid/v1".parse().expect("valid URL");
        config.relay.google.base_url = "http://google.invalid/v1".parse().expect("valid URL");
        config.relay.amazon.endpoint_url = Some("http://polly.invalid".parse().expect("valid URL"));
        config.relay.timeout = "5s".to_owned();

        Self { config }
    }

    /// Point the ElevenLabs endpoints at `base_url`
    pub fn with_elevenlabs(mut self, base_url: &str) -> Self {
        self.config.relay.elevenlabs.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Point Google Cloud TTS at `base_url`
    pub fn with_google(mut self, base_url: &str) -> Self {
        self.config.relay.google.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Point Amazon Polly at `endpoint_url`
    pub fn with_amazon(mut self, endpoint_url: &str) -> Self {
        self.config.relay.amazon.endpoint_url = Some(endpoint_url.parse().expect("valid URL"));
        self
    }

    /// Set the per-call provider timeout
    pub fn with_timeout(mut self, timeout: &str) -> Self {
        timeout.clone_into(&mut self.config.relay.timeout);
        self
    }

    /// Set the inbound body limit
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.config.relay.body_limit = limit;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Disable echo endpoint
    pub fn without_echo(mut self) -> Self {
        self.config.server.echo.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
