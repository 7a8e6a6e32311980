//! DNS resolution with a primary and a fallback nameserver set.
//!
//! Every lookup picks one nameserver uniformly at random from the primary
//! set; if that query fails, times out or has no usable answer, one
//! nameserver is picked from the fallback set and the query is retried once.
//! Ordinary resolution failure is never an error: it is `None`.
//!
//! Nameservers are chosen per call, and the transport opens a fresh session
//! for every query.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hostmap_common::config::Config;
use hostmap_protocols::{DnsRecord, RecordKind};
use rand::seq::IndexedRandom;
use tracing::trace;

mod nameservers;
mod transport;

pub use nameservers::discover_nameservers;
pub use transport::{DnsTransport, UdpTransport};

pub struct Resolver {
    transport: Arc<dyn DnsTransport>,
    nameservers: Vec<SocketAddr>,
    fallback_nameservers: Vec<SocketAddr>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        transport: Arc<dyn DnsTransport>,
        nameservers: Vec<SocketAddr>,
        fallback_nameservers: Vec<SocketAddr>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            nameservers,
            fallback_nameservers,
            timeout,
        }
    }

    /// A resolver using `nameservers` as primaries and the configured
    /// fallbacks and timeout.
    pub fn with_config(transport: Arc<dyn DnsTransport>, nameservers: Vec<SocketAddr>, cfg: &Config) -> Self {
        Self::new(
            transport,
            nameservers,
            cfg.fallback_nameservers.clone(),
            cfg.dns_timeout,
        )
    }

    /// Resolves `host` to its first IPv4 address.
    pub async fn resolve(&self, host: &str) -> Option<IpAddr> {
        match self.lookup(host, RecordKind::A).await.into_iter().next() {
            Some(DnsRecord::A(ip)) => Some(IpAddr::V4(ip)),
            _ => None,
        }
    }

    /// Fetches the raw CNAME record of `host`, or its A record when it has
    /// no alias.
    pub async fn resource(&self, host: &str) -> Option<DnsRecord> {
        if let Some(cname) = self.lookup(host, RecordKind::Cname).await.into_iter().next() {
            return Some(cname);
        }
        self.lookup(host, RecordKind::A).await.into_iter().next()
    }

    /// All records of `kind` from the first nameserver set that has any.
    pub async fn lookup(&self, host: &str, kind: RecordKind) -> Vec<DnsRecord> {
        let primary = self.query_one(&self.nameservers, host, kind).await;
        if !primary.is_empty() {
            return primary;
        }
        self.query_one(&self.fallback_nameservers, host, kind).await
    }

    async fn query_one(&self, set: &[SocketAddr], host: &str, kind: RecordKind) -> Vec<DnsRecord> {
        let Some(nameserver) = pick(set) else {
            return Vec::new();
        };

        match self.transport.query(nameserver, host, kind, self.timeout).await {
            Ok(answer) => answer
                .records
                .into_iter()
                .filter(|r| r.kind() == kind)
                .collect(),
            Err(e) => {
                trace!(%host, %nameserver, %kind, "lookup failed: {e:#}");
                Vec::new()
            }
        }
    }
}

fn pick(set: &[SocketAddr]) -> Option<SocketAddr> {
    set.choose(&mut rand::rng()).copied()
}
