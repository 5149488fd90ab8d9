//! Trusted network set.
//!
//! Built once from configuration and shared read-only (`Arc<TrustSet>`)
//! across every request handler. There is no mutation API.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net};

use crate::error::TrustSetError;

/// Immutable collection of trusted CIDR ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustSet {
    networks: Vec<IpNet>,
}

impl TrustSet {
    /// Parse every entry as CIDR. Fails on the first malformed entry and
    /// returns no partial set.
    pub fn build<I, S>(cidrs: I) -> Result<Self, TrustSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = cidrs
            .into_iter()
            .map(|cidr| {
                let cidr = cidr.as_ref();
                cidr.parse::<IpNet>()
                    .map(canonical_net)
                    .map_err(|source| TrustSetError {
                        cidr: cidr.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { networks })
    }

    /// True if `ip` falls inside any trusted range.
    ///
    /// IPv4-mapped IPv6 addresses are matched as IPv4.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.networks.iter().any(|net| net.contains(&ip))
    }

    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// `::ffff:a.b.c.d/n` with `n >= 96` is stored as `a.b.c.d/(n - 96)` so it
/// matches the canonical form `contains` compares against.
fn canonical_net(net: IpNet) -> IpNet {
    match net {
        IpNet::V6(v6) if v6.prefix_len() >= 96 => match v6.addr().to_ipv4_mapped() {
            Some(v4) => Ipv4Net::new(v4, v6.prefix_len() - 96)
                .map(IpNet::V4)
                .unwrap_or(net),
            None => net,
        },
        _ => net,
    }
}
