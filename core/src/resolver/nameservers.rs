use std::net::SocketAddr;

use hostmap_common::network::nameserver::DNS_PORT;
use hostmap_protocols::{DnsRecord, RecordKind};
use tracing::debug;

use super::Resolver;

/// Finds the authoritative nameservers of `zone` and resolves them to
/// addresses.
///
/// Walks from the full name towards (but excluding) the top-level label and
/// stops at the first name that has NS records. Returns an empty list when
/// nothing is found.
pub async fn discover_nameservers(resolver: &Resolver, zone: &str) -> Vec<SocketAddr> {
    let labels: Vec<&str> = zone.trim_end_matches('.').split('.').collect();

    for start in 0..labels.len().saturating_sub(1) {
        let lookup = labels[start..].join(".");
        let records = resolver.lookup(&lookup, RecordKind::Ns).await;
        if records.is_empty() {
            continue;
        }

        let mut addrs: Vec<SocketAddr> = Vec::new();
        for record in records {
            let DnsRecord::Ns(name) = record else { continue };
            match resolver.resolve(&name).await {
                Some(ip) => {
                    let addr = SocketAddr::new(ip, DNS_PORT);
                    if !addrs.contains(&addr) {
                        addrs.push(addr);
                    }
                }
                None => debug!(nameserver = %name, "could not resolve nameserver host"),
            }
        }
        return addrs;
    }

    Vec::new()
}
