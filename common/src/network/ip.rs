//! IPv4 classification helpers used when filtering resolution results.

use std::net::{IpAddr, Ipv4Addr};

use pnet::ipnetwork::Ipv4Network;

/// Ranges treated as private when private exclusion is enabled.
///
/// RFC1918 plus loopback.
const PRIVATE_BLOCKS: [(Ipv4Addr, u8); 4] = [
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
];

pub fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => PRIVATE_BLOCKS.iter().any(|(base, prefix)| {
            Ipv4Network::new(*base, *prefix).is_ok_and(|net| net.contains(*v4))
        }),
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
    }
}

pub fn is_broadcast(ip: &IpAddr) -> bool {
    matches!(ip, IpAddr::V4(v4) if v4.is_broadcast())
}

/// The `/24` prefix of an IPv4 address as its first three octets, e.g. `10.0.0`.
pub fn subnet_prefix(ip: &IpAddr) -> Option<String> {
    let IpAddr::V4(v4) = ip else {
        return None;
    };
    let network = Ipv4Network::new(*v4, 24).ok()?.network();
    let [a, b, c, _] = network.octets();
    Some(format!("{a}.{b}.{c}"))
}
