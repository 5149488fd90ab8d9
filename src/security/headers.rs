//! Client-identity header handling.
//!
//! # Responsibilities
//! - Read the forwarded-for chain from the inbound request
//! - Overwrite the real-IP header (an inbound value is never trusted)
//! - Replace or remove the forwarded-for header
//!
//! Several forwarded-for field lines are treated as one comma-separated
//! list, in the order received.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::security::real_ip::{Chain, Resolution};

pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// What to emit as forwarded-for when the client chain is discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardMode {
    /// Restart the chain at the real IP.
    #[default]
    Reset,
    /// Delete the header.
    Remove,
}

/// Names of the two headers this proxy owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    pub real_ip: HeaderName,
    pub forwarded_for: HeaderName,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            real_ip: HeaderName::from_static(X_REAL_IP),
            forwarded_for: HeaderName::from_static(X_FORWARDED_FOR),
        }
    }
}

/// Collect the forwarded-for chain, joining repeated field lines.
pub fn forwarded_for_value(
    headers: &HeaderMap,
    name: &HeaderName,
) -> Result<Option<String>, ResolveError> {
    let mut joined: Option<String> = None;
    for value in headers.get_all(name) {
        let value = value
            .to_str()
            .map_err(|_| ResolveError::unparsable(&String::from_utf8_lossy(value.as_bytes())))?;
        match joined.as_mut() {
            Some(acc) => {
                acc.push(',');
                acc.push_str(value);
            }
            None => joined = Some(value.to_string()),
        }
    }
    Ok(joined)
}

/// Write the resolution into the outbound headers.
///
/// Both values are built before any header is touched, so on error the
/// headers are left as received.
pub fn apply(
    resolution: &Resolution,
    headers: &mut HeaderMap,
    names: &HeaderNames,
    discard_mode: DiscardMode,
) -> Result<(), ResolveError> {
    let real_ip = header_value(&resolution.real_ip.to_string())?;
    let forwarded_for = match (&resolution.chain, discard_mode) {
        (Chain::Truncated(entries), _) => Some(header_value(&entries.join(", "))?),
        (Chain::Discarded(_), DiscardMode::Reset) => Some(real_ip.clone()),
        (Chain::Discarded(_), DiscardMode::Remove) => None,
    };

    headers.insert(names.real_ip.clone(), real_ip);
    match forwarded_for {
        Some(value) => {
            headers.insert(names.forwarded_for.clone(), value);
        }
        None => {
            headers.remove(&names.forwarded_for);
        }
    }
    Ok(())
}

fn header_value(s: &str) -> Result<HeaderValue, ResolveError> {
    HeaderValue::from_str(s).map_err(|_| ResolveError::unparsable(s))
}
