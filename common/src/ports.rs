//! Named TCP port lists and port-list parsing.

use crate::error::{Error, Result};

pub const SMALL: &[u16] = &[80, 443];

pub const MEDIUM: &[u16] = &[80, 443, 8000, 8080, 8443];

pub const LARGE: &[u16] = &[
    80, 81, 443, 591, 2082, 2087, 2095, 2096, 3000, 8000, 8001, 8008, 8080, 8083, 8443, 8834, 8888,
];

pub const HUGE: &[u16] = &[
    80, 81, 300, 443, 591, 593, 832, 981, 1010, 1311, 2082, 2087, 2095, 2096, 2480, 3000, 3128,
    3333, 4243, 4567, 4711, 4712, 4993, 5000, 5104, 5108, 5800, 6543, 6379, 7000, 7396, 7474, 8000,
    8001, 8008, 8014, 8042, 8069, 8080, 8081, 8088, 8090, 8091, 8118, 8123, 8172, 8222, 8243, 8280,
    8281, 8333, 8443, 8500, 8834, 8880, 8888, 8983, 9000, 9043, 9060, 9080, 9090, 9091, 9200, 9443,
    9800, 9981, 1000, 12443, 16080, 18091, 18092, 27018, 20720, 28017,
];

/// Ports that are assumed to speak TLS when building URLs.
pub const SSL_PORTS: &[u16] = &[
    443, 454, 455, 832, 981, 1010, 1311, 2053, 2083, 2087, 2096, 4016, 4018, 4020, 4022, 4712,
    7000, 8081, 8172, 8243, 8333, 8443, 8834, 9443, 18091, 18092,
];

pub fn port_list_by_name(name: &str) -> Result<&'static [u16]> {
    match name.trim().to_ascii_lowercase().as_str() {
        "small" => Ok(SMALL),
        "medium" | "default" => Ok(MEDIUM),
        "large" => Ok(LARGE),
        "huge" | "xlarge" => Ok(HUGE),
        _ => Err(Error::UnknownPortList(name.to_string())),
    }
}

/// Parses either a named list or a comma separated list of ports.
///
/// Duplicates are dropped while the first-seen order is kept.
pub fn parse_ports(input: &str) -> Result<Vec<u16>> {
    let trimmed = input.trim();
    if !trimmed.contains(',') && trimmed.parse::<u16>().is_err() {
        return Ok(port_list_by_name(trimmed)?.to_vec());
    }

    let mut ports: Vec<u16> = Vec::new();
    for raw in trimmed.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let port: u16 = raw
            .parse()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| Error::InvalidPort(raw.to_string()))?;
        if !ports.contains(&port) {
            ports.push(port);
        }
    }

    if ports.is_empty() {
        return Err(Error::InvalidPort(input.to_string()));
    }
    Ok(ports)
}

pub fn is_ssl_port(port: u16) -> bool {
    SSL_PORTS.contains(&port)
}
