//! Address classification and client address reporting.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::Serialize;

/// Client address split by family, as reported by `/myip`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientAddress {
    /// IPv4 address of the client, if it connected over IPv4.
    pub ipv4: Option<String>,
    /// IPv6 address of the client, if it connected over IPv6.
    pub ipv6: Option<String>,
}

impl From<IpAddr> for ClientAddress {
    fn from(ip: IpAddr) -> Self {
        match canonical(ip) {
            IpAddr::V4(v4) => Self {
                ipv4: Some(v4.to_string()),
                ipv6: None,
            },
            IpAddr::V6(v6) => Self {
                ipv4: None,
                ipv6: Some(v6.to_string()),
            },
        }
    }
}

/// Unwrap IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`).
pub fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// First address of an `X-Forwarded-For` header value.
pub fn first_forwarded(header: &str) -> Option<IpAddr> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .and_then(|candidate| candidate.parse().ok())
}

/// Whether the address is globally routable and therefore worth a
/// geolocation lookup.
pub fn is_public(ip: IpAddr) -> bool {
    match canonical(ip) {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    let special = ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_multicast()
        // 0.0.0.0/8 "this network"
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240;
    !special
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let segments = ip.segments();
    let special = ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        // fc00::/7 unique local
        || (segments[0] & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (segments[0] & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (segments[0] == 0x2001 && segments[1] == 0x0db8)
        // 100::/64 discard-only
        || (segments[0] == 0x0100 && segments[1..4] == [0, 0, 0])
        // 64:ff9b:1::/48 local-use translation
        || (segments[0] == 0x0064 && segments[1] == 0xff9b && segments[2] == 0x0001)
        // 2001::/23 IETF protocol assignments
        || (segments[0] == 0x2001 && segments[1] < 0x0200);
    !special
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_public_addresses() {
        for addr in ["8.8.8.8", "1.1.1.1", "151.101.1.69", "2606:4700:4700::1111", "::ffff:8.8.4.4"] {
            assert!(is_public(ip(addr)), "{addr}");
        }
    }

    #[test]
    fn test_non_public_addresses() {
        for addr in [
            "10.1.2.3",
            "172.16.0.1",
            "192.168.0.1",
            "127.0.0.1",
            "169.254.1.1",
            "100.64.0.1",
            "0.1.2.3",
            "192.0.2.1",
            "198.18.0.1",
            "240.0.0.1",
            "255.255.255.255",
            "224.0.0.1",
            "::1",
            "::",
            "fd00::1",
            "fe80::1",
            "2001:db8::1",
            "::ffff:192.168.1.1",
        ] {
            assert!(!is_public(ip(addr)), "{addr}");
        }
    }

    #[test]
    fn test_client_address_by_family() {
        assert_eq!(
            ClientAddress::from(ip("203.0.114.7")),
            ClientAddress {
                ipv4: Some("203.0.114.7".into()),
                ipv6: None,
            }
        );
        assert_eq!(
            ClientAddress::from(ip("::ffff:203.0.114.7")).ipv4.as_deref(),
            Some("203.0.114.7")
        );
        assert_eq!(
            ClientAddress::from(ip("2001:4860::8888")).ipv6.as_deref(),
            Some("2001:4860::8888")
        );
    }

    #[test]
    fn test_first_forwarded() {
        assert_eq!(
            first_forwarded("198.51.100.9, 10.0.0.1"),
            Some(ip("198.51.100.9"))
        );
        assert_eq!(first_forwarded(" 2001:db8::5 "), Some(ip("2001:db8::5")));
        assert_eq!(first_forwarded("unknown"), None);
    }
}
