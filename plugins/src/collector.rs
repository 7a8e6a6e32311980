use async_trait::async_trait;
use hostmap_common::config::Config;

use crate::{PluginError, registry::Plugin};

/// What a collector gets to work with.
pub struct CollectorContext<'a> {
    /// The root domain under assessment, already validated and lowercased.
    pub domain: &'a str,
    pub config: &'a Config,
}

/// A source of candidate hostnames.
///
/// Returned names are raw; the discovery pipeline lowercases, validates and
/// deduplicates them.
#[async_trait]
pub trait Collector: Plugin + Send + Sync {
    fn description(&self) -> &str;

    async fn run(&self, ctx: &CollectorContext<'_>) -> Result<Vec<String>, PluginError>;
}
