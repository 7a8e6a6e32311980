use async_trait::async_trait;

use crate::{Collector, CollectorContext, Plugin, PluginError};

/// Reads hostnames, one per line, produced by external discovery tooling.
///
/// Names outside the target domain are dropped.
pub struct HostList;

impl Plugin for HostList {
    fn name(&self) -> &str {
        "Host List"
    }

    fn priority(&self) -> u8 {
        2
    }
}

#[async_trait]
impl Collector for HostList {
    fn description(&self) -> &str {
        "Reads candidate hostnames from a file"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> Result<Vec<String>, PluginError> {
        let Some(path) = &ctx.config.host_list else {
            return Err(PluginError::MissingRequirement(
                "no host list file configured".into(),
            ));
        };
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PluginError::Malfunction(format!("{}: {e}", path.display())))?;

        let suffix = format!(".{}", ctx.domain);
        Ok(contents
            .lines()
            .map(|l| l.trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|h| h == ctx.domain || h.ends_with(&suffix))
            .collect())
    }
}
