use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;

/// Voxrelay text-to-speech relay
#[derive(Debug, Parser)]
#[command(
    name = "voxrelay",
    about = "HTTP relay for ElevenLabs, Google Cloud TTS and Amazon Polly with caller-supplied credentials"
)]
pub struct Args {
    /// Path to configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "VOXRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "VOXRELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override only the listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

impl Args {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Resolve the address to bind: `--listen`, then `--port`, then the configured address
    pub fn listen_address(&self, configured: SocketAddr) -> SocketAddr {
        if let Some(listen) = self.listen {
            return listen;
        }

        match self.port {
            Some(port) => SocketAddr::new(configured.ip(), port),
            None => configured,
        }
    }
}
