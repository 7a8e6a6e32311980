use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::network::nameserver::{self, DNS_PORT};
use crate::ports;

pub const DEFAULT_THREADS: usize = 25;
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_JITTER_PERCENT: u8 = 30;
pub const MAX_THREADS: usize = 1024;

pub const FALLBACK_NAMESERVERS: [&str; 3] = ["1.1.1.1", "8.8.8.8", "9.9.9.9"];

const OUTPUT_ENV: &str = "HOSTMAP_PATH";
const OUTPUT_DIR_NAME: &str = "hostmap";

/// Immutable settings for one run. Built once, then shared read-only by
/// every pipeline and worker.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary nameservers. Empty means "look up the zone's NS records".
    pub nameservers: Vec<SocketAddr>,
    pub fallback_nameservers: Vec<SocketAddr>,
    pub dns_timeout: Duration,
    pub probe_timeout: Duration,
    /// Worker count. Ignored (forced to 1) while rate limiting.
    pub threads: usize,
    /// Base delay between tasks. Enables rate limiting when set.
    pub sleep: Option<Duration>,
    pub jitter_percent: u8,
    pub ports: Vec<u16>,
    pub ignore_private: bool,

    pub only_collectors: Vec<String>,
    pub disable_collectors: Vec<String>,
    pub only_detectors: Vec<String>,
    pub disable_detectors: Vec<String>,
    pub wordlist: Option<PathBuf>,
    pub host_list: Option<PathBuf>,

    /// Root directory holding one assessment directory per domain.
    pub output_root: PathBuf,
    /// Disables the keyboard progress monitor.
    pub disable_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            fallback_nameservers: default_fallback_nameservers(),
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            threads: DEFAULT_THREADS,
            sleep: None,
            jitter_percent: DEFAULT_JITTER_PERCENT,
            ports: ports::MEDIUM.to_vec(),
            ignore_private: false,
            only_collectors: Vec::new(),
            disable_collectors: Vec::new(),
            only_detectors: Vec::new(),
            disable_detectors: Vec::new(),
            wordlist: None,
            host_list: None,
            output_root: default_output_root(),
            disable_input: false,
        }
    }
}

impl Config {
    /// Rejects settings that would make a pipeline misbehave.
    ///
    /// Runs before any concurrent phase starts.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 || self.threads > MAX_THREADS {
            return Err(Error::InvalidConfig(format!(
                "thread count must be between 1 and {MAX_THREADS}, got {}",
                self.threads
            )));
        }
        if self.jitter_percent > 100 {
            return Err(Error::InvalidConfig(format!(
                "jitter must be a percentage between 0 and 100, got {}",
                self.jitter_percent
            )));
        }
        if self.ports.is_empty() {
            return Err(Error::InvalidConfig("port list is empty".into()));
        }
        if self.nameservers.is_empty() && self.fallback_nameservers.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one nameserver or fallback nameserver is required".into(),
            ));
        }
        if self.dns_timeout.is_zero() || self.probe_timeout.is_zero() {
            return Err(Error::InvalidConfig("timeouts must be non-zero".into()));
        }
        Ok(())
    }

    pub fn is_rate_limited(&self) -> bool {
        self.sleep.is_some()
    }

    /// Effective worker count: one while rate limiting so delays serialize.
    pub fn worker_count(&self) -> usize {
        if self.is_rate_limited() { 1 } else { self.threads }
    }

    pub fn assessment_dir(&self, domain: &str) -> PathBuf {
        self.output_root.join(domain)
    }
}

pub fn default_fallback_nameservers() -> Vec<SocketAddr> {
    nameserver::parse_nameservers(FALLBACK_NAMESERVERS).unwrap_or_else(|_| {
        vec![SocketAddr::from(([1, 1, 1, 1], DNS_PORT))]
    })
}

/// `$HOSTMAP_PATH`, else `~/hostmap`, else `./hostmap`.
pub fn default_output_root() -> PathBuf {
    if let Some(path) = std::env::var_os(OUTPUT_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .map(|home| home.join(OUTPUT_DIR_NAME))
        .unwrap_or_else(|| Path::new(".").join(OUTPUT_DIR_NAME))
}
