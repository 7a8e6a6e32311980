//! Parsing of operator-supplied nameserver addresses.

use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};

pub const DNS_PORT: u16 = 53;

/// Parses `IP` or `IP:port` (IPv6 as `[addr]:port`). A bare IP uses port 53.
pub fn parse_nameserver(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    if let Ok(ip) = value.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }
    value
        .parse::<SocketAddr>()
        .map_err(|_| Error::InvalidNameserver(value.to_string()))
}

pub fn parse_nameservers<I, S>(values: I) -> Result<Vec<SocketAddr>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| parse_nameserver(v.as_ref()))
        .collect()
}
