//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.
//! Every field has a default so a minimal file only lists `trusted_ips`
//! and the upstream.

use serde::{Deserialize, Serialize};

use crate::security::headers::{DiscardMode, X_FORWARDED_FOR, X_REAL_IP};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Instance name, used in log lines.
    pub name: String,

    /// CIDR ranges whose forwarded-for claims are believed.
    pub trusted_ips: Vec<String>,

    /// What to emit as forwarded-for when the client chain is discarded.
    pub discarded_chain: DiscardMode,

    pub listener: ListenerConfig,

    pub upstream: UpstreamConfig,

    pub headers: HeaderConfig,

    pub timeouts: TimeoutConfig,

    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            name: "real-ip".to_string(),
            trusted_ips: Vec::new(),
            discarded_chain: DiscardMode::default(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            headers: HeaderConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The service requests are handed to after rewriting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Header names owned by the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub real_ip: String,
    pub forwarded_for: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            real_ip: X_REAL_IP.to_string(),
            forwarded_for: X_FORWARDED_FOR.to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
