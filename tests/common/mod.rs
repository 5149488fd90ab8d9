//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, routing::any, Router};
use tokio::net::TcpListener;

use real_ip_proxy::config::ProxyConfig;
use real_ip_proxy::security::TrustSet;
use real_ip_proxy::{HttpServer, Shutdown};

/// Start an upstream that answers with the identity headers it received,
/// as `"<x-real-ip>|<x-forwarded-for>"`. Returns its address and a hit counter.
pub async fn start_echo_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn echo(State(hits): State<Arc<AtomicUsize>>, headers: HeaderMap) -> String {
        hits.fetch_add(1, Ordering::SeqCst);
        let get = |name: &str| {
            headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(",")
        };
        format!("{}|{}", get("x-real-ip"), get("x-forwarded-for"))
    }

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, hits)
}

/// Start the proxy in front of `upstream`, trusting `trusted`.
pub async fn start_proxy(upstream: SocketAddr, trusted: &[&str]) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.trusted_ips = trusted.iter().map(|s| s.to_string()).collect();
    config.upstream.address = upstream.to_string();

    let trust = Arc::new(TrustSet::build(&config.trusted_ips).unwrap());
    let server = HttpServer::new(config, trust).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
