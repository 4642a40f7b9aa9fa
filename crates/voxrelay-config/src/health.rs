use serde::Deserialize;

/// Liveness endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_health_path(),
        }
    }
}

/// Debug endpoint that echoes the received body
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_echo_path")]
    pub path: String,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_echo_path(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
pub(crate) fn default_enabled() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_echo_path() -> String {
    "/test".to_string()
}
