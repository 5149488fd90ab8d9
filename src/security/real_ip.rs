//! Forwarded-for chain resolution.
//!
//! Given the peer address and the client-supplied `X-Forwarded-For` value,
//! decide which address is the real client and which part of the chain is
//! kept.
//!
//! # Algorithm
//! ```text
//! peer untrusted          → real ip = peer, chain discarded
//! peer trusted:
//!   walk chain right → left, stop at first untrusted entry (boundary)
//!     boundary found      → real ip = boundary, chain = chain[boundary..]
//!     every entry trusted → real ip = peer, chain discarded
//! ```
//!
//! Any unparsable entry aborts the whole resolution.

use std::net::IpAddr;

use crate::error::ResolveError;
use crate::net::peer::parse_peer;
use crate::security::trust::TrustSet;

/// Why the client-supplied chain was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// The peer is outside every trusted range; its claims are ignored.
    UntrustedPeer,
    /// Every hop is trusted (or there are none), so the chain names no client.
    FullyTrusted,
}

/// What happens to the forwarded-for chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chain {
    Discarded(Discard),
    /// Entries from the boundary through the newest hop, in original order.
    Truncated(Vec<String>),
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub real_ip: IpAddr,
    pub chain: Chain,
}

impl Resolution {
    /// Forwarded-for value to emit when the chain is kept.
    pub fn forwarded_for(&self) -> Option<String> {
        match &self.chain {
            Chain::Truncated(entries) => Some(entries.join(", ")),
            Chain::Discarded(_) => None,
        }
    }

    /// Stable label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self.chain {
            Chain::Discarded(Discard::UntrustedPeer) => "untrusted_peer",
            Chain::Discarded(Discard::FullyTrusted) => "fully_trusted",
            Chain::Truncated(_) => "truncated",
        }
    }
}

/// Resolve the real client IP for one request.
///
/// `peer` is the transport address in `host:port` form. `forwarded_for`
/// is the raw chain header, oldest hop first.
pub fn resolve(
    trust: &TrustSet,
    peer: &str,
    forwarded_for: Option<&str>,
) -> Result<Resolution, ResolveError> {
    let peer_ip = parse_peer(peer)?;

    if !trust.contains(peer_ip) {
        return Ok(Resolution {
            real_ip: peer_ip,
            chain: Chain::Discarded(Discard::UntrustedPeer),
        });
    }

    // Proxies do not agree on the space after the comma.
    let entries: Vec<&str> = match forwarded_for.map(str::trim) {
        Some(value) if !value.is_empty() => value.split(',').map(str::trim).collect(),
        _ => Vec::new(),
    };

    let mut boundary = None;
    for (idx, entry) in entries.iter().enumerate().rev() {
        let ip: IpAddr = entry
            .parse()
            .map_err(|_| ResolveError::unparsable(entry))?;
        if !trust.contains(ip) {
            boundary = Some((idx, ip));
            break;
        }
    }

    let resolution = match boundary {
        Some((idx, ip)) => Resolution {
            real_ip: ip,
            chain: Chain::Truncated(entries[idx..].iter().map(|e| e.to_string()).collect()),
        },
        None => Resolution {
            real_ip: peer_ip,
            chain: Chain::Discarded(Discard::FullyTrusted),
        },
    };

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trust() -> TrustSet {
        TrustSet::build(["10.0.0.0/24"]).unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_untrusted_peer_ignores_chain() {
        let res = resolve(&trust(), "10.0.1.0:9000", Some("127.0.0.2, 10.0.1.0")).unwrap();
        assert_eq!(res.real_ip, ip("10.0.1.0"));
        assert_eq!(res.chain, Chain::Discarded(Discard::UntrustedPeer));
        assert_eq!(res.forwarded_for(), None);
    }

    #[test]
    fn test_untrusted_peer_ignores_garbage_chain() {
        // Chain is never parsed when the peer is untrusted.
        let res = resolve(&trust(), "1.2.3.4:1", Some("not-an-ip, 10.0.0.1")).unwrap();
        assert_eq!(res.real_ip, ip("1.2.3.4"));
        assert_eq!(res.outcome(), "untrusted_peer");
    }

    #[test]
    fn test_trusted_peer_single_hop() {
        let res = resolve(&trust(), "10.0.0.1:9000", Some("1.1.1.1, 10.0.0.1")).unwrap();
        assert_eq!(res.real_ip, ip("1.1.1.1"));
        assert_eq!(res.forwarded_for().as_deref(), Some("1.1.1.1, 10.0.0.1"));
    }

    #[test]
    fn test_trusted_peer_truncates_before_boundary() {
        let res = resolve(
            &trust(),
            "10.0.0.1:9000",
            Some("10.0.0.3, 1.1.1.1, 10.0.0.20, 10.0.0.1"),
        )
        .unwrap();
        assert_eq!(res.real_ip, ip("1.1.1.1"));
        assert_eq!(
            res.forwarded_for().as_deref(),
            Some("1.1.1.1, 10.0.0.20, 10.0.0.1")
        );
    }

    #[test]
    fn test_rightmost_untrusted_wins() {
        let res = resolve(&trust(), "10.0.0.1:9000", Some("9.9.9.9, 8.8.8.8, 10.0.0.5")).unwrap();
        assert_eq!(res.real_ip, ip("8.8.8.8"));
        assert_eq!(res.forwarded_for().as_deref(), Some("8.8.8.8, 10.0.0.5"));
    }

    #[test]
    fn test_boundary_is_newest_entry() {
        let res = resolve(&trust(), "10.0.0.1:9000", Some("10.0.0.4, 5.5.5.5")).unwrap();
        assert_eq!(res.real_ip, ip("5.5.5.5"));
        assert_eq!(res.forwarded_for().as_deref(), Some("5.5.5.5"));
    }

    #[test]
    fn test_missing_or_empty_chain() {
        for header in [None, Some(""), Some("   ")] {
            let res = resolve(&trust(), "10.0.0.1:9000", header).unwrap();
            assert_eq!(res.real_ip, ip("10.0.0.1"));
            assert_eq!(res.chain, Chain::Discarded(Discard::FullyTrusted));
        }
    }

    #[test]
    fn test_fully_trusted_chain_behaves_like_no_chain() {
        let res = resolve(&trust(), "10.0.0.1:9000", Some("10.0.0.9, 10.0.0.8")).unwrap();
        assert_eq!(res.real_ip, ip("10.0.0.1"));
        assert_eq!(res.outcome(), "fully_trusted");
        assert_eq!(res.forwarded_for(), None);
    }

    #[test]
    fn test_whitespace_tolerance() {
        let spaced = resolve(&trust(), "10.0.0.1:1", Some("1.1.1.1, 10.0.0.2")).unwrap();
        let tight = resolve(&trust(), "10.0.0.1:1", Some("1.1.1.1,10.0.0.2")).unwrap();
        let loose = resolve(&trust(), "10.0.0.1:1", Some(" 1.1.1.1 ,\t10.0.0.2 ")).unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(spaced, loose);
        assert_eq!(tight.forwarded_for().as_deref(), Some("1.1.1.1, 10.0.0.2"));
    }

    #[test]
    fn test_unparsable_entry_is_an_error() {
        let err = resolve(&trust(), "10.0.0.1:9000", Some("1.1.1.1, bogus")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnparsableIp {
                value: "bogus".to_string()
            }
        );
    }

    #[test]
    fn test_entries_past_boundary_are_not_parsed() {
        let res = resolve(&trust(), "10.0.0.1:9000", Some("bogus, 1.1.1.1")).unwrap();
        assert_eq!(res.real_ip, ip("1.1.1.1"));
    }

    #[test]
    fn test_empty_inner_entry_is_an_error() {
        let err = resolve(&trust(), "10.0.0.1:9000", Some("1.1.1.1,,10.0.0.2")).unwrap_err();
        assert!(matches!(err, ResolveError::UnparsableIp { .. }));
    }

    #[test]
    fn test_malformed_peer() {
        let err = resolve(&trust(), "10.0.0.1", None).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedPeerAddress { .. }));
    }

    #[test]
    fn test_unparsable_peer() {
        let err = resolve(&trust(), "example.com:80", None).unwrap_err();
        assert!(matches!(err, ResolveError::UnparsableIp { .. }));
    }

    #[test]
    fn test_zoned_v6_peer() {
        let set = TrustSet::build(["fe80::/10"]).unwrap();
        let res = resolve(&set, "[fe80::1%eth0]:80", Some("2001:db8::1")).unwrap();
        assert_eq!(res.real_ip, ip("2001:db8::1"));
        assert_eq!(res.forwarded_for().as_deref(), Some("2001:db8::1"));
    }
}
