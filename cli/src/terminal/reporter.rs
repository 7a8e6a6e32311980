use std::net::IpAddr;

use colored::*;
use hostmap_common::success;
use hostmap_core::reporter::list_domains;
use hostmap_core::{Reporter, Snapshot, TakeoverFinding};
use tracing::{error, info, warn};

use crate::terminal::colors;

/// Renders pipeline events for a human at a terminal.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
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
        success!(
            "{} {}",
            format!("{ip:<15}").color(colors::IPV4_ADDR),
            host.color(colors::HOSTNAME)
        );
    }

    fn port_open(&self, ip: &IpAddr, port: u16, domains: &[String]) {
        success!(
            "{} {} {}",
            format!("{:<9}", format!("{port}/tcp")).color(colors::PORT),
            format!("{ip:<15}").color(colors::IPV4_ADDR),
            list_domains(domains).color(colors::HOSTNAME)
        );
    }

    fn takeover_found(&self, finding: &TakeoverFinding) {
        success!(
            "{} {} {}",
            finding.host.color(colors::VULNERABLE).bold(),
            format!("[{}]", finding.info.service).color(colors::ACCENT),
            format!("{} {}", finding.resource.kind(), finding.resource.value()).color(colors::TEXT_DEFAULT)
        );
    }

    fn status(&self, snapshot: &Snapshot) {
        info!("{}", snapshot.to_string().color(colors::TEXT_DEFAULT));
    }
}
