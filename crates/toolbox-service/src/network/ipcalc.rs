//! Subnet arithmetic for IPv4 and IPv6.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::Serialize;

use toolbox_core::error::AppError;
use toolbox_core::result::AppResult;

/// Message for out-of-range or unparsable prefix lengths.
pub const INVALID_PREFIX: &str = "Invalid prefix length for the given IP version.";

/// Description of the network containing an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetInfo {
    /// `network/prefix`.
    pub prefix: String,
    /// Netmask in address notation.
    pub netmask: String,
    /// Network address.
    pub network: String,
    /// Last address of the network.
    pub broadcast: String,
    /// First usable host.
    pub hostmin: String,
    /// Last usable host.
    pub hostmax: String,
    /// Number of usable hosts.
    pub hosts_net: u128,
}

/// Parse an address the way the HTTP layer receives it.
pub fn parse_ip(raw: &str) -> AppResult<IpAddr> {
    raw.parse().map_err(|_| {
        AppError::validation(format!(
            "'{raw}' does not appear to be an IPv4 or IPv6 address"
        ))
    })
}

/// Parse a prefix length; anything but a small non-negative integer is
/// rejected with the same message as an out-of-range length.
pub fn parse_prefix(raw: &str) -> AppResult<u8> {
    raw.parse().map_err(|_| AppError::validation(INVALID_PREFIX))
}

/// Compute the network of `ip/prefix`. Host bits of `ip` are ignored.
///
/// Networks of one or two addresses have no separate network/broadcast
/// addresses, so every address counts as a host.
pub fn calculate(ip: IpAddr, prefix: u8) -> AppResult<SubnetInfo> {
    match ip {
        IpAddr::V4(addr) => {
            let (network, broadcast, mask, hosts) = span(u32::from(addr).into(), prefix, 32)?;
            let render = |v: u128| Ipv4Addr::from(v as u32).to_string();
            Ok(build(network, broadcast, mask, hosts, prefix, render))
        }
        IpAddr::V6(addr) => {
            let (network, broadcast, mask, hosts) = span(u128::from(addr), prefix, 128)?;
            let render = |v: u128| Ipv6Addr::from(v).to_string();
            Ok(build(network, broadcast, mask, hosts, prefix, render))
        }
    }
}

/// `(network, broadcast, netmask, usable hosts)` in a `bits`-wide space.
fn span(addr: u128, prefix: u8, bits: u32) -> AppResult<(u128, u128, u128, u128)> {
    let prefix = u32::from(prefix);
    if prefix > bits {
        return Err(AppError::validation(INVALID_PREFIX));
    }

    let width_mask = if bits == 128 { u128::MAX } else { (1u128 << bits) - 1 };
    let host_bits = bits - prefix;
    let host_mask = if host_bits == 128 { u128::MAX } else { (1u128 << host_bits) - 1 };
    let netmask = width_mask & !host_mask;

    let network = addr & netmask;
    let broadcast = network | host_mask;

    // 2^128 - 2 still fits, 2^128 itself does not.
    let hosts = match host_bits {
        128 => u128::MAX - 1,
        0 => 1,
        1 => 2,
        n => (1u128 << n) - 2,
    };

    Ok((network, broadcast, netmask, hosts))
}

fn build(
    network: u128,
    broadcast: u128,
    netmask: u128,
    hosts: u128,
    prefix: u8,
    render: impl Fn(u128) -> String,
) -> SubnetInfo {
    let has_reserved = broadcast - network >= 2;
    let (hostmin, hostmax) = if has_reserved {
        (network + 1, broadcast - 1)
    } else {
        (network, broadcast)
    };

    SubnetInfo {
        prefix: format!("{}/{prefix}", render(network)),
        netmask: render(netmask),
        network: render(network),
        broadcast: render(broadcast),
        hostmin: render(hostmin),
        hostmax: render(hostmax),
        hosts_net: hosts,
    }
}
