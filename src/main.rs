//! real-ip-proxy
//!
//! Sits between trusted edge proxies and an upstream service and rewrites
//! `X-Real-Ip` / `X-Forwarded-For` so the upstream sees the real client.
//!
//! ```text
//!   client ──▶ edge proxy (trusted) ──▶ real-ip-proxy ──▶ upstream
//!                                       │
//!                                       ├─ peer trusted? walk X-Forwarded-For
//!                                       ├─ set X-Real-Ip
//!                                       └─ cut X-Forwarded-For at real client
//! ```

use std::path::PathBuf;

use clap::Parser;

use real_ip_proxy::config::{self, validation::validate_config, ConfigError, ProxyConfig};
use real_ip_proxy::lifecycle::{signals, startup, Shutdown};
use real_ip_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "real-ip-proxy")]
#[command(about = "Rewrites client-identity headers behind trusted proxies", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trusted network in CIDR form; repeatable. Replaces `trusted_ips` from the file.
    #[arg(short = 't', long = "trusted-ip")]
    trusted_ips: Vec<String>,

    /// Upstream address; overrides the file.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Listen address; overrides the file.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ProxyConfig::default(),
        };
        if !self.trusted_ips.is_empty() {
            config.trusted_ips = self.trusted_ips;
        }
        if let Some(upstream) = self.upstream {
            config.upstream.address = upstream;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability)?;
    tracing::info!(name = %config.name, "real-ip-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = startup::start(config).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
