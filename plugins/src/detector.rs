use async_trait::async_trait;
use hostmap_protocols::DnsRecord;

use crate::{PluginError, registry::Plugin};

/// Descriptive metadata persisted alongside a positive verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorInfo {
    pub service: String,
    pub service_website: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Positive,
    Negative,
}

pub struct DetectionContext<'a> {
    pub host: &'a str,
    /// The host's CNAME or A record.
    pub resource: &'a DnsRecord,
}

/// Decides whether a host is a takeover candidate for one service.
#[async_trait]
pub trait Detector: Plugin + Send + Sync {
    fn info(&self) -> DetectorInfo;

    async fn run(&self, ctx: &DetectionContext<'_>) -> Result<Verdict, PluginError>;
}
