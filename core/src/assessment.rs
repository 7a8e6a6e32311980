//! The on-disk result set of one domain.
//!
//! Each pipeline reads the files an earlier pipeline left behind and writes
//! its own. Formats are plain so external tooling can consume them:
//!
//! | file             | contents                                   |
//! |------------------|--------------------------------------------|
//! | `hosts.txt`      | `host,ip` per line                         |
//! | `hosts.json`     | `{ "host": "ip", ... }`                    |
//! | `open_ports.txt` | `ip,port,port,...` per line, sorted by IP  |
//! | `urls.txt`       | one URL per line, sorted and deduplicated  |
//! | `takeovers.json` | host to detector info and DNS resource     |

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use hostmap_common::{Error, Result};
use hostmap_plugins::DetectorInfo;
use hostmap_protocols::DnsRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const HOSTS_TXT: &str = "hosts.txt";
pub const HOSTS_JSON: &str = "hosts.json";
pub const OPEN_PORTS_TXT: &str = "open_ports.txt";
pub const URLS_TXT: &str = "urls.txt";
pub const TAKEOVERS_JSON: &str = "takeovers.json";

const DISCOVER_HINT: &str = "hostmap discover";

pub type HostMap = BTreeMap<String, IpAddr>;
pub type PortMap = BTreeMap<IpAddr, BTreeSet<u16>>;

/// A positive takeover verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeoverFinding {
    pub host: String,
    pub info: DetectorInfo,
    pub resource: DnsRecord,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct TakeoverRecord {
    service: String,
    service_website: String,
    description: String,
    resource: ResourceRecord,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct ResourceRecord {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

impl From<&TakeoverFinding> for TakeoverRecord {
    fn from(finding: &TakeoverFinding) -> Self {
        Self {
            service: finding.info.service.clone(),
            service_website: finding.info.service_website.clone(),
            description: finding.info.description.clone(),
            resource: ResourceRecord {
                kind: finding.resource.kind().to_string(),
                value: finding.resource.value(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assessment {
    dir: PathBuf,
}

impl Assessment {
    /// Opens (creating if needed) `root/domain`.
    pub fn open(root: &Path, domain: &str) -> Result<Self> {
        let dir = root.join(domain);
        fs::create_dir_all(&dir)?;
        debug!("Using assessment directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.dir.join(name).is_file()
    }

    pub fn read_file(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.join(name))?)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<()> {
        fs::write(self.dir.join(name), contents)?;
        debug!("Wrote {}", self.dir.join(name).display());
        Ok(())
    }

    fn require(&self, file: &'static str, hint: &'static str) -> Result<String> {
        if !self.has_file(file) {
            return Err(Error::MissingPrerequisite {
                dir: self.dir.clone(),
                file,
                hint,
            });
        }
        self.read_file(file)
    }

    /// Writes both `hosts.txt` and `hosts.json`.
    pub fn write_hosts(&self, hosts: &HostMap) -> Result<()> {
        let lines: String = hosts
            .iter()
            .map(|(host, ip)| format!("{host},{ip}\n"))
            .collect();
        self.write_file(HOSTS_TXT, &lines)?;
        self.write_file(HOSTS_JSON, &serde_json::to_string_pretty(hosts)?)
    }

    pub fn read_hosts(&self) -> Result<HostMap> {
        let raw = self.require(HOSTS_JSON, DISCOVER_HINT)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_open_ports(&self, ports: &PortMap) -> Result<()> {
        let mut out = String::new();
        for (ip, open) in ports.iter().filter(|(_, open)| !open.is_empty()) {
            out.push_str(&ip.to_string());
            for port in open {
                out.push(',');
                out.push_str(&port.to_string());
            }
            out.push('\n');
        }
        self.write_file(OPEN_PORTS_TXT, &out)
    }

    /// Loads `open_ports.txt` for library consumers building on a scan.
    pub fn read_open_ports(&self) -> Result<PortMap> {
        let raw = self.require(OPEN_PORTS_TXT, "hostmap scan")?;
        let mut ports = PortMap::new();

        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || Error::MalformedResult {
                file: OPEN_PORTS_TXT,
                line: idx + 1,
                content: line.to_string(),
            };

            let mut fields = line.split(',');
            let ip: IpAddr = fields
                .next()
                .and_then(|f| f.trim().parse().ok())
                .ok_or_else(malformed)?;
            let entry = ports.entry(ip).or_default();
            for field in fields {
                entry.insert(field.trim().parse().map_err(|_| malformed())?);
            }
        }

        Ok(ports)
    }

    pub fn write_urls(&self, urls: &BTreeSet<String>) -> Result<()> {
        let lines: String = urls.iter().map(|url| format!("{url}\n")).collect();
        self.write_file(URLS_TXT, &lines)
    }

    pub fn write_takeovers(&self, findings: &[TakeoverFinding]) -> Result<()> {
        let records: BTreeMap<&str, TakeoverRecord> = findings
            .iter()
            .map(|f| (f.host.as_str(), TakeoverRecord::from(f)))
            .collect();
        self.write_file(TAKEOVERS_JSON, &serde_json::to_string_pretty(&records)?)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
