use async_trait::async_trait;

use crate::{Collector, CollectorContext, Plugin, PluginError};

/// Used when no wordlist is configured.
const BUILTIN_WORDS: &[&str] = &[
    "www", "mail", "webmail", "remote", "vpn", "api", "dev", "staging", "test", "admin", "portal",
    "blog", "shop", "m", "mobile", "app", "cdn", "static", "assets", "img", "docs", "support",
    "help", "status", "git", "ci", "jenkins", "jira", "wiki", "intranet", "sso", "auth", "login",
    "beta", "demo", "ftp", "smtp", "imap", "pop", "ns1", "ns2", "mx", "autodiscover", "owa",
];

/// Prefixes every word of a wordlist onto the target domain.
pub struct Dictionary;

impl Plugin for Dictionary {
    fn name(&self) -> &str {
        "Dictionary"
    }
}

#[async_trait]
impl Collector for Dictionary {
    fn description(&self) -> &str {
        "Uses a dictionary to find hostnames"
    }

    async fn run(&self, ctx: &CollectorContext<'_>) -> Result<Vec<String>, PluginError> {
        let words: Vec<String> = match &ctx.config.wordlist {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PluginError::Malfunction(format!("{}: {e}", path.display())))?
                .lines()
                .map(str::to_string)
                .collect(),
            None => BUILTIN_WORDS.iter().map(|w| w.to_string()).collect(),
        };

        Ok(words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .map(|w| format!("{w}.{}", ctx.domain))
            .collect())
    }
}
