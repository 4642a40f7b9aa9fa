#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod relay;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use relay::*;
pub use server::*;
pub use telemetry::*;

/// Top-level voxrelay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inbound server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound relay configuration
    #[serde(default)]
    pub relay: RelayConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
