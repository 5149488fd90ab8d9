//! Error definitions shared by the resolver and the trust set.

use thiserror::Error;

/// Errors that abort resolution of a single request.
///
/// Neither variant is recoverable for the request at hand: the middleware
/// answers `500` and does not call the next service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The transport-level peer address could not be split into host and port.
    #[error("malformed peer address {addr:?}: {reason}")]
    MalformedPeerAddress { addr: String, reason: &'static str },

    /// The peer host or a forwarded-for entry is not an IP address.
    #[error("unparsable IP address {value:?}")]
    UnparsableIp { value: String },
}

impl ResolveError {
    pub(crate) fn malformed(addr: &str, reason: &'static str) -> Self {
        Self::MalformedPeerAddress {
            addr: addr.to_string(),
            reason,
        }
    }

    pub(crate) fn unparsable(value: &str) -> Self {
        Self::UnparsableIp {
            value: value.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedPeerAddress { .. } => "malformed_peer_address",
            Self::UnparsableIp { .. } => "unparsable_ip",
        }
    }
}

/// A trusted network entry could not be parsed as CIDR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid trusted network {cidr:?}: {source}")]
pub struct TrustSetError {
    pub cidr: String,
    #[source]
    pub source: ipnet::AddrParseError,
}
