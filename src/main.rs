//! Service proxy binary.
//!
//! ```text
//!     Client Request ──▶ listener ──▶ ServiceProxy middleware ──▶ Backend
//!                                        │        ▲
//!                                        ▼        │
//!                                     UrlCache ◀── Resolver
//! ```
//!
//! Configuration comes from a TOML file (`--config`); the domain may come
//! from `SERVICE_PROXY_DOMAIN` and service URLs from
//! `SERVICE_PROXY_SERVICE_MAP`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use service_proxy::config::load_config;
use service_proxy::http::HttpServer;
use service_proxy::lifecycle::Shutdown;
use service_proxy::observability::{logging, metrics};
use service_proxy::resolver::StaticResolver;

#[derive(Parser)]
#[command(name = "service-proxy")]
#[command(about = "Forward requests to a resolved backend service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "service-proxy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability.log_level);
    tracing::info!(config = %cli.config.display(), "service-proxy v0.1.0 starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let resolver = StaticResolver::from_config(&config.resolver).with_env_overrides();
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, Arc::new(resolver))?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
