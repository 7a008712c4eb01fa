//! SSRF guard
//!
//! Classifies request targets as private/internal or public. [`is_blocked`]
//! looks only at the URL itself; [`resolves_to_private`] additionally checks
//! what a domain name resolves to.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Hostname suffixes that never route to the public internet
const INTERNAL_SUFFIXES: &[&str] = &[".localhost", ".local", ".internal"];

/// Returns true if the URL targets a private, loopback, link-local or
/// otherwise reserved host
///
/// A URL that cannot be parsed or has no host is blocked.
pub fn is_blocked(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => is_blocked_url(&parsed),
        Err(_) => true,
    }
}

/// Same as [`is_blocked`] for an already parsed URL
pub fn is_blocked_url(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_private_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_private_ipv6(ip),
        Some(Host::Domain(domain)) => is_internal_hostname(domain),
        None => true,
    }
}

/// Check whether an address belongs to a non-public range
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

fn is_internal_hostname(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain.is_empty()
        || domain == "localhost"
        || INTERNAL_SUFFIXES
            .iter()
            .any(|suffix| domain.ends_with(suffix))
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 shared address space
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = embedded_ipv4(ip) {
        return is_private_ipv4(v4);
    }

    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (first & 0xffc0) == 0xfe80
        // fec0::/10 site-local (deprecated)
        || (first & 0xffc0) == 0xfec0
        // 2001:db8::/32 documentation
        || (first == 0x2001 && ip.segments()[1] == 0x0db8)
}

/// IPv4 address carried inside an IPv6 one (mapped, NAT64 or 6to4)
fn embedded_ipv4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return Some(v4);
    }

    let s = ip.segments();
    let from_pair = |hi: u16, lo: u16| {
        Ipv4Addr::new((hi >> 8) as u8, hi as u8, (lo >> 8) as u8, lo as u8)
    };

    match s {
        // 64:ff9b::/96
        [0x0064, 0xff9b, 0, 0, 0, 0, hi, lo] => Some(from_pair(hi, lo)),
        // 2002::/16
        [0x2002, hi, lo, ..] => Some(from_pair(hi, lo)),
        _ => None,
    }
}

/// Name resolution used by the DNS-aware check
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve a hostname to its addresses
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Returns true if a domain host resolves to any private address
///
/// IP literals are left to [`is_blocked_url`]. Resolution failures are not
/// treated as blocked; the request itself will fail to connect.
pub async fn resolves_to_private(url: &Url, resolver: &dyn HostResolver) -> bool {
    let Some(Host::Domain(domain)) = url.host() else {
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(80);

    match resolver.resolve(domain, port).await {
        Ok(addrs) => addrs.into_iter().any(is_private_ip),
        Err(e) => {
            tracing::debug!(host = domain, error = %e, "Host resolution failed");
            false
        }
    }
}
