use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use hostmap_common::validation::normalize_domain;
use hostmap_core::wildcard::WildcardFilter;
use hostmap_core::{Resolver, UdpTransport};

use crate::support::StubDnsServer;

#[tokio::test]
async fn responder_answering_everything_is_a_wildcard() {
    let server = StubDnsServer::start([203, 0, 113, 5]).await;
    let resolver = Resolver::new(Arc::new(UdpTransport), vec![server.addr], vec![server.addr], Duration::from_secs(2));

    let report = WildcardFilter::new(&resolver).detect("example.com").await;

    let expected: IpAddr = "203.0.113.5".parse().unwrap();
    assert!(report.is_wildcard);
    assert_eq!(report.wildcard_ips, HashSet::from([expected]));
}

#[tokio::test]
async fn udp_transport_resolves_through_stub() {
    let server = StubDnsServer::start([198, 51, 100, 20]).await;
    let resolver = Resolver::new(Arc::new(UdpTransport), vec![server.addr], Vec::new(), Duration::from_secs(2));

    assert_eq!(
        resolver.resolve("www.example.com").await,
        Some("198.51.100.20".parse().unwrap())
    );
}

#[tokio::test]
async fn longest_valid_label_resolves() {
    let server = StubDnsServer::start([198, 51, 100, 21]).await;
    let resolver = Resolver::new(Arc::new(UdpTransport), vec![server.addr], Vec::new(), Duration::from_secs(2));

    let host = normalize_domain(&format!("{}.example.com", "a".repeat(63))).unwrap();
    assert_eq!(resolver.resolve(&host).await, Some("198.51.100.21".parse().unwrap()));

    let oversized = format!("{}.example.com", "a".repeat(64));
    assert_eq!(resolver.resolve(&oversized).await, None);
}
