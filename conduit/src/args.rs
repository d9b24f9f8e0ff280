use std::path::PathBuf;

use clap::Parser;

/// Conduit protocol-translation gateway
#[derive(Debug, Parser)]
#[command(name = "conduit", about = "OpenAI-compatible gateway for the Anthropic Messages API")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "conduit.toml", env = "CONDUIT_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "CONDUIT_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
