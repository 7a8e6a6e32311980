use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hostmap_common::config::Config;
use hostmap_core::{Context, DnsTransport, NoopMonitor, Reporter, Snapshot, TakeoverFinding};
use hostmap_protocols::{DnsAnswer, DnsRecord, RecordKind};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Answers from a fixed table; anything else is NXDOMAIN unless a wildcard
/// zone covers it.
#[derive(Default)]
pub struct StubTransport {
    records: HashMap<(String, RecordKind), Vec<DnsRecord>>,
    wildcard: Option<(String, Ipv4Addr)>,
}

impl StubTransport {
    pub fn with_a(mut self, host: &str, ip: [u8; 4]) -> Self {
        self.records
            .entry((host.to_string(), RecordKind::A))
            .or_default()
            .push(DnsRecord::A(Ipv4Addr::from(ip)));
        self
    }

    /// Every A query for an unlisted name under `zone` answers `ip`.
    pub fn with_wildcard(mut self, zone: &str, ip: [u8; 4]) -> Self {
        self.wildcard = Some((format!(".{zone}"), Ipv4Addr::from(ip)));
        self
    }

    pub fn with_cname(mut self, host: &str, target: &str) -> Self {
        self.records
            .entry((host.to_string(), RecordKind::Cname))
            .or_default()
            .push(DnsRecord::Cname(target.to_string()));
        self
    }
}

#[async_trait]
impl DnsTransport for StubTransport {
    async fn query(
        &self,
        _nameserver: SocketAddr,
        host: &str,
        kind: RecordKind,
        _timeout: Duration,
    ) -> anyhow::Result<DnsAnswer> {
        let records = match self.records.get(&(host.to_string(), kind)) {
            Some(records) => records.clone(),
            None => match &self.wildcard {
                Some((suffix, ip)) if kind == RecordKind::A && host.ends_with(suffix.as_str()) => {
                    vec![DnsRecord::A(*ip)]
                }
                _ => Vec::new(),
            },
        };
        Ok(DnsAnswer {
            id: 0,
            nx_domain: records.is_empty(),
            records,
        })
    }
}

/// Collects everything a pipeline reports.
#[derive(Default)]
pub struct RecordingReporter {
    pub hosts: Mutex<Vec<(String, IpAddr)>>,
    pub ports: Mutex<Vec<(IpAddr, u16)>>,
    pub takeovers: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn notice(&self, _message: &str) {}

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, _message: &str) {}

    fn host_found(&self, host: &str, ip: &IpAddr) {
        self.hosts.lock().unwrap().push((host.to_string(), *ip));
    }

    fn port_open(&self, ip: &IpAddr, port: u16, _domains: &[String]) {
        self.ports.lock().unwrap().push((*ip, port));
    }

    fn takeover_found(&self, finding: &TakeoverFinding) {
        self.takeovers.lock().unwrap().push(finding.host.clone());
    }

    fn status(&self, _snapshot: &Snapshot) {}
}

/// A config writing into `root`, querying a nameserver nobody listens on.
pub fn config(root: &Path) -> Config {
    Config {
        nameservers: vec![SocketAddr::from(([192, 0, 2, 53], 53))],
        fallback_nameservers: vec![SocketAddr::from(([192, 0, 2, 54], 53))],
        dns_timeout: Duration::from_millis(500),
        probe_timeout: Duration::from_millis(500),
        threads: 8,
        output_root: root.to_path_buf(),
        disable_input: true,
        ..Config::default()
    }
}

pub fn context(config: Config, transport: StubTransport) -> (Context, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let ctx = Context::new(config, reporter.clone(), Arc::new(NoopMonitor)).with_transport(Arc::new(transport));
    (ctx, reporter)
}

/// A UDP DNS server on localhost that answers every question with one A
/// record for `ip`.
pub struct StubDnsServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StubDnsServer {
    pub async fn start(ip: [u8; 4]) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                if len < 12 {
                    continue;
                }
                let response = answer_with(&buf[..len], ip);
                let _ = socket.send_to(&response, peer).await;
            }
        });
        Self { addr, handle }
    }
}

impl Drop for StubDnsServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Turns a single-question query into a response carrying one A record.
fn answer_with(query: &[u8], ip: [u8; 4]) -> Vec<u8> {
    let mut packet = query.to_vec();
    packet[2] = 0x81; // QR, RD
    packet[3] = 0x80; // RA, NOERROR
    packet[6..8].copy_from_slice(&1u16.to_be_bytes());
    packet[8..12].fill(0);

    packet.extend_from_slice(&[0xC0, 0x0C]); // name: pointer to the question
    packet.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]); // A, IN
    packet.extend_from_slice(&60u32.to_be_bytes());
    packet.extend_from_slice(&4u16.to_be_bytes());
    packet.extend_from_slice(&ip);
    packet
}
