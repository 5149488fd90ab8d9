//! Peer address normalization.
//!
//! Turns the transport's `host:port` string into an [`IpAddr`]:
//! split host and port, drop any IPv6 zone, parse.

use std::net::IpAddr;

use crate::error::ResolveError;

/// Split `host:port`, `[host]:port` or `[host%zone]:port`.
///
/// The port is returned unparsed and may be empty.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), ResolveError> {
    if let Some(rest) = addr.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| ResolveError::malformed(addr, "missing ']' in address"))?;
        let host = &rest[..end];
        let after = &rest[end + 1..];
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| ResolveError::malformed(addr, "missing port in address"))?;
        if host.contains('[') || port.contains('[') || port.contains(']') {
            return Err(ResolveError::malformed(addr, "unexpected bracket in address"));
        }
        return Ok((host, port));
    }

    let colon = addr
        .rfind(':')
        .ok_or_else(|| ResolveError::malformed(addr, "missing port in address"))?;
    let (host, port) = (&addr[..colon], &addr[colon + 1..]);
    if host.contains(':') {
        return Err(ResolveError::malformed(addr, "too many colons in address"));
    }
    if host.contains('[') || host.contains(']') || port.contains('[') || port.contains(']') {
        return Err(ResolveError::malformed(addr, "unexpected bracket in address"));
    }
    Ok((host, port))
}

/// Drop an IPv6 zone identifier (`fe80::1%eth0` → `fe80::1`).
pub fn strip_zone(host: &str) -> &str {
    match host.find('%') {
        Some(idx) => &host[..idx],
        None => host,
    }
}

/// Extract the peer IP from a transport address string.
pub fn parse_peer(addr: &str) -> Result<IpAddr, ResolveError> {
    let (host, _port) = split_host_port(addr)?;
    let host = strip_zone(host);
    host.parse().map_err(|_| ResolveError::unparsable(host))
}
