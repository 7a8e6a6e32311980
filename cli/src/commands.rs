pub mod discover;
pub mod scan;
pub mod takeover;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use hostmap_common::config::{self, Config};
use hostmap_common::network::nameserver;
use hostmap_common::ports;

#[derive(Parser)]
#[command(name = "hostmap")]
#[command(version, about = "Subdomain discovery, port scanning and takeover checks for a domain.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub run: RunArgs,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find hosts of a domain by resolving candidate names
    #[command(alias = "d")]
    Discover { domain: String },
    /// Probe TCP ports on the addresses found by discover
    #[command(alias = "s")]
    Scan { domain: String },
    /// Check discovered hosts for dangling DNS records
    #[command(alias = "t")]
    Takeover { domain: String },
}

impl Commands {
    pub fn domain(&self) -> &str {
        match self {
            Commands::Discover { domain } | Commands::Scan { domain } | Commands::Takeover { domain } => domain,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Nameservers to query (IP or IP:port); defaults to the zone's own
    #[arg(short, long, value_delimiter = ',', global = true)]
    pub nameservers: Vec<String>,

    /// Nameservers used when a query against the primaries fails
    #[arg(long, value_delimiter = ',', global = true)]
    pub fallback_nameservers: Vec<String>,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = config::DEFAULT_THREADS, global = true)]
    pub threads: usize,

    /// DNS query timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_DNS_TIMEOUT.as_secs_f64(), global = true)]
    pub timeout: f64,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_PROBE_TIMEOUT.as_secs_f64(), global = true)]
    pub probe_timeout: f64,

    /// Seconds to wait between tasks; implies a single worker
    #[arg(long, global = true)]
    pub sleep: Option<f64>,

    /// Random variation applied to --sleep, in percent
    #[arg(long, default_value_t = config::DEFAULT_JITTER_PERCENT, global = true)]
    pub jitter: u8,

    /// Port list name (small, medium, large, huge) or comma-separated ports
    #[arg(short, long, default_value = "medium", global = true)]
    pub ports: String,

    /// Drop hosts resolving to private addresses
    #[arg(long, global = true)]
    pub ignore_private: bool,

    /// Run only these collectors
    #[arg(long, value_delimiter = ',', global = true)]
    pub only_collectors: Vec<String>,

    /// Skip these collectors
    #[arg(long, value_delimiter = ',', global = true)]
    pub disable_collectors: Vec<String>,

    /// Run only these detectors
    #[arg(long, value_delimiter = ',', global = true)]
    pub only_detectors: Vec<String>,

    /// Skip these detectors
    #[arg(long, value_delimiter = ',', global = true)]
    pub disable_detectors: Vec<String>,

    /// Word list for the dictionary collector
    #[arg(short, long, global = true)]
    pub wordlist: Option<PathBuf>,

    /// File of hostnames for the host list collector
    #[arg(long, global = true)]
    pub host_list: Option<PathBuf>,

    /// Directory holding assessment results [default: $HOSTMAP_PATH or ~/hostmap]
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Ignore keyboard input while running
    #[arg(long, global = true)]
    pub no_input: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let defaults = Config::default();
        let fallback_nameservers = if self.fallback_nameservers.is_empty() {
            defaults.fallback_nameservers
        } else {
            nameserver::parse_nameservers(&self.fallback_nameservers)?
        };

        Ok(Config {
            nameservers: nameserver::parse_nameservers(&self.nameservers)?,
            fallback_nameservers,
            dns_timeout: seconds(self.timeout, "--timeout")?,
            probe_timeout: seconds(self.probe_timeout, "--probe-timeout")?,
            threads: self.threads,
            sleep: self.sleep.map(|s| seconds(s, "--sleep")).transpose()?,
            jitter_percent: self.jitter,
            ports: ports::parse_ports(&self.ports)?,
            ignore_private: self.ignore_private,
            only_collectors: self.only_collectors.clone(),
            disable_collectors: self.disable_collectors.clone(),
            only_detectors: self.only_detectors.clone(),
            disable_detectors: self.disable_detectors.clone(),
            wordlist: self.wordlist.clone(),
            host_list: self.host_list.clone(),
            output_root: self.output.clone().unwrap_or(defaults.output_root),
            disable_input: self.no_input,
        })
    }
}

fn seconds(value: f64, flag: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| anyhow::anyhow!("{flag} must be a non-negative number of seconds"))
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
