//! The output handle passed into every pipeline and worker.
//!
//! Workers never write to the terminal directly; they report through a
//! [`Reporter`], and the front-end decides how lines are rendered and
//! serialized.

use std::net::IpAddr;

use hostmap_common::success;
use tracing::{error, info, warn};

use crate::assessment::TakeoverFinding;
use crate::progress::Snapshot;

/// Domains printed next to an open port before the rest are summarized.
pub const MAX_LISTED_DOMAINS: usize = 3;

pub trait Reporter: Send + Sync {
    fn notice(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    /// A candidate that resolved and survived filtering.
    fn host_found(&self, host: &str, ip: &IpAddr);
    fn port_open(&self, ip: &IpAddr, port: u16, domains: &[String]);
    fn takeover_found(&self, finding: &TakeoverFinding);
    fn status(&self, snapshot: &Snapshot);
}

/// Reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn notice(&self, message: &str) {
        info!("{message}");
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }

    fn host_found(&self, host: &str, ip: &IpAddr) {
        success!("{ip:<15} {host}");
    }

    fn port_open(&self, ip: &IpAddr, port: u16, domains: &[String]) {
        let port = format!("{port}/tcp");
        success!("{port:<9} {ip:<15} {}", list_domains(domains));
    }

    fn takeover_found(&self, finding: &TakeoverFinding) {
        success!(
            "{} is vulnerable to takeover via {} ({} {})",
            finding.host,
            finding.info.service,
            finding.resource.kind(),
            finding.resource.value()
        );
    }

    fn status(&self, snapshot: &Snapshot) {
        info!("{snapshot}");
    }
}

/// `a, b, c and 4 more`.
pub fn list_domains(domains: &[String]) -> String {
    if domains.len() <= MAX_LISTED_DOMAINS {
        return domains.join(", ");
    }
    format!(
        "{} and {} more",
        domains[..MAX_LISTED_DOMAINS].join(", "),
        domains.len() - MAX_LISTED_DOMAINS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("h{i}.example.com")).collect()
    }

    #[test]
    fn short_lists_are_printed_whole() {
        assert_eq!(list_domains(&names(2)), "h0.example.com, h1.example.com");
        assert_eq!(list_domains(&[]), "");
    }

    #[test]
    fn long_lists_are_summarized() {
        assert_eq!(
            list_domains(&names(5)),
            "h0.example.com, h1.example.com, h2.example.com and 2 more"
        );
    }
}
