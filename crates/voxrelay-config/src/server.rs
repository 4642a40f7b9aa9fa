use std::net::SocketAddr;

use serde::Deserialize;

use crate::{
    cors::CorsConfig,
    health::{EchoConfig, HealthConfig},
};

/// Port used when neither the config file nor the command line names one
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub echo: EchoConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Listen address, falling back to all interfaces on [`DEFAULT_PORT`]
    pub fn listen_address_or_default(&self) -> SocketAddr {
        self.listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}
