//! Provider balancer demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     HTTP request (demo route)
//!         │
//!         ▼
//!   ┌──────────────┐  register/remove  ┌──────────────┐   attach/detach   ┌────────────────┐
//!   │ LoadBalancer │──────────────────▶│ ProviderPool │◀──────────────────│ HealthChecker  │
//!   │  dispatch()  │◀── get() ─────────│ random / rr  │                   │ (one per       │
//!   └──────┬───────┘                   └──────────────┘                   │  provider)     │
//!          │ handle(work)                                                 └───────┬────────┘
//!          ▼                                                                      │ alive()
//!   ┌──────────────┐◀─────────────────────────────────────────────────────────────┘
//!   │   Provider   │
//!   └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use provider_balancer::config::loader::load_config;
use provider_balancer::config::AppConfig;
use provider_balancer::http::DemoServer;
use provider_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "provider-balancer")]
#[command(about = "In-process load balancer demo server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("provider-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_providers = config.balancer.max_providers_capacity,
        algorithm = ?config.balancer.selection_algorithm,
        providers = config.providers.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    DemoServer::new(config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
