//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every trusted network parses as CIDR
//! - Addresses and header names are usable
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use axum::http::{uri::Authority, HeaderName};
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::error::TrustSetError;
use crate::security::trust::TrustSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    TrustedNetwork(#[from] TrustSetError),

    #[error("{field}: invalid address {value:?}")]
    Address { field: &'static str, value: String },

    #[error("{field}: invalid header name {value:?}")]
    HeaderName { field: &'static str, value: String },

    #[error("headers.real_ip and headers.forwarded_for must differ")]
    DuplicateHeaderName,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for cidr in &config.trusted_ips {
        if let Err(e) = TrustSet::build([cidr]) {
            errors.push(e.into());
        }
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_upstream(&mut errors, &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let real_ip = check_header(&mut errors, "headers.real_ip", &config.headers.real_ip);
    let forwarded_for = check_header(
        &mut errors,
        "headers.forwarded_for",
        &config.headers.forwarded_for,
    );
    if let (Some(a), Some(b)) = (real_ip, forwarded_for) {
        if a == b {
            errors.push(ValidationError::DuplicateHeaderName);
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}

/// The upstream may be a DNS name; the connector resolves it per request.
fn check_upstream(errors: &mut Vec<ValidationError>, value: &str) {
    let valid = value
        .parse::<Authority>()
        .map(|authority| authority.port_u16().is_some())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::Address {
            field: "upstream.address",
            value: value.to_string(),
        });
    }
}

fn check_header(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
) -> Option<HeaderName> {
    match HeaderName::try_from(value) {
        Ok(name) => Some(name),
        Err(_) => {
            errors.push(ValidationError::HeaderName {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
