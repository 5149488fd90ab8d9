//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware
//!   (trace → timeout → real-ip → upstream forwarding)
//! - Forward rewritten requests to the configured upstream
//! - Serve with connect info so the peer address reaches the middleware
//! - Graceful shutdown

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        HeaderName, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::middleware::real_ip::{RealIpLayer, RealIpSettings};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security::headers::HeaderNames;
use crate::security::trust::TrustSet;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{field}: invalid header name {value:?}")]
    HeaderName { field: &'static str, value: String },

    #[error("invalid upstream address {0:?}")]
    Upstream(String),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Authority,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server: real-IP rewriting in front of a single upstream.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    pub fn new(config: ProxyConfig, trust: Arc<TrustSet>) -> Result<Self, ServerError> {
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::Upstream(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let settings = RealIpSettings {
            name: config.name.clone(),
            headers: HeaderNames {
                real_ip: header_name("headers.real_ip", &config.headers.real_ip)?,
                forwarded_for: header_name("headers.forwarded_for", &config.headers.forwarded_for)?,
            },
            discard_mode: config.discarded_chain,
        };

        let state = AppState { upstream, client };
        let router = Self::build_router(&config, state, RealIpLayer::new(trust, settings));
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, real_ip: RealIpLayer) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(state)
            .layer(real_ip)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until a shutdown notification arrives on `shutdown_rx`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

fn header_name(field: &'static str, value: &str) -> Result<HeaderName, ServerError> {
    HeaderName::try_from(value).map_err(|_| ServerError::HeaderName {
        field,
        value: value.to_string(),
    })
}

/// Hand the (already rewritten) request to the upstream.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    // The upstream connection is plain HTTP/1.1 regardless of the inbound protocol.
    parts.version = Version::HTTP_11;

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_REQUEST, "Bad request").into_response();
        }
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16());
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16());
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
