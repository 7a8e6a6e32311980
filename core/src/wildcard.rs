//! Wildcard DNS detection.
//!
//! A zone is wildcard-enabled when a random, almost certainly unregistered
//! label resolves. The set of wildcard addresses is then sampled by resolving
//! further random labels. This is a heuristic: a zone that rotates through a
//! large pool of addresses may not be fully characterized.

use std::collections::HashSet;
use std::net::IpAddr;

use rand::seq::SliceRandom;
use tracing::debug;

use crate::resolver::Resolver;

/// Additional random labels resolved once a wildcard is detected.
pub const WILDCARD_SAMPLES: usize = 20;

const LABEL_LEN: usize = 10;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardReport {
    pub is_wildcard: bool,
    pub wildcard_ips: HashSet<IpAddr>,
}

impl WildcardReport {
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.wildcard_ips.contains(ip)
    }
}

pub struct WildcardFilter<'a> {
    resolver: &'a Resolver,
}

impl<'a> WildcardFilter<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    pub async fn detect(&self, zone: &str) -> WildcardReport {
        let Some(first) = self.resolver.resolve(&random_host(zone)).await else {
            return WildcardReport::default();
        };

        let mut wildcard_ips = HashSet::from([first]);
        for _ in 0..WILDCARD_SAMPLES {
            if let Some(ip) = self.resolver.resolve(&random_host(zone)).await {
                wildcard_ips.insert(ip);
            }
        }

        debug!(%zone, ips = wildcard_ips.len(), "wildcard zone characterized");
        WildcardReport {
            is_wildcard: true,
            wildcard_ips,
        }
    }
}

/// A random 10-character label of distinct lowercase letters and digits.
pub fn random_label() -> String {
    let mut chars = ALPHABET.to_vec();
    chars.shuffle(&mut rand::rng());
    chars.truncate(LABEL_LEN);
    chars.into_iter().map(char::from).collect()
}

fn random_host(zone: &str) -> String {
    format!("{}.{zone}", random_label())
}
