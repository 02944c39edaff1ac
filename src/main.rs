//! RPS Arena
//!
//! Reads newline-delimited JSON requests on stdin and answers on stdout.
//! Logs go to stderr so they never mix with responses.

use tracing::info;
use tracing_subscriber::EnvFilter;

use rps_arena::{
    VERSION,
    network::server::{ArenaServer, ServerConfig},
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();

    info!("RPS Arena v{}", VERSION);
    info!("Max nonce length: {} bytes", config.max_nonce_len);
    info!("Max request size: {} bytes", config.max_request_bytes);

    let server = ArenaServer::new(config);
    let handled = server
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await?;

    info!("Shutting down after {} requests", handled);
    Ok(())
}
