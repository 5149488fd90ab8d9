//! Startup orchestration.
//!
//! Config is validated before anything else, the trust set is built once,
//! and the listener binds last so traffic only arrives when ready. Any
//! error here is fatal.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::error::TrustSetError;
use crate::http::server::ServerError;
use crate::http::HttpServer;
use crate::security::trust::TrustSet;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    TrustSet(#[from] TrustSetError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the server and bind its listener.
pub async fn start(config: ProxyConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let trust = Arc::new(TrustSet::build(&config.trusted_ips)?);
    if trust.is_empty() {
        tracing::warn!("No trusted networks configured; every forwarded-for chain will be discarded");
    }
    for net in trust.networks() {
        tracing::info!(network = %net, "Trusted network");
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, trust)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok((server, listener))
}
