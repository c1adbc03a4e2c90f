//! SSRF validator: a pure predicate over a URL string, no DNS resolution.
//! Parse failure means reject. This is defense-in-depth only, not a
//! substitute for a network-level egress policy.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::Url;

const BLOCKED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];
const BLOCKED_PORTS: &[u16] = &[22, 23, 25, 53, 69, 110, 135, 139, 143, 445, 993, 995];

/// Returns true only if the URL is safe to proxy to.
pub fn is_valid_proxy_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = url.host_str() else {
        return false;
    };

    if BLOCKED_HOSTS.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return false;
    }

    if is_blocked_ipv4(host) {
        return false;
    }

    if is_blocked_ipv6_prefix(host) {
        return false;
    }

    if let Some(port) = url.port() {
        if BLOCKED_PORTS.contains(&port) {
            return false;
        }
    }

    true
}

fn is_blocked_ipv4(host: &str) -> bool {
    let Ok(addr) = host.parse::<Ipv4Addr>() else {
        return false;
    };
    let octets = addr.octets();
    match octets[0] {
        10 => true,
        192 if octets[1] == 168 => true,
        169 if octets[1] == 254 => true,
        172 => (16..=31).contains(&octets[1]),
        _ => false,
    }
}

fn is_blocked_ipv6_prefix(host: &str) -> bool {
    // Bracketed literals (as they appear in a URL authority) and bare
    // literals (as `Url::host_str` returns them) both need checking.
    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    let Ok(addr) = trimmed.parse::<Ipv6Addr>() else {
        return false;
    };
    let segments = addr.segments();
    let first = segments[0];
    // fc00::/7 covers both fc00: and fd00: (unique local addresses).
    (first & 0xfe00) == 0xfc00
}
