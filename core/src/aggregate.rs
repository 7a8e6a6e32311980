//! Read-only summaries derived from a finished result set.

use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;

use hostmap_common::network::ip;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetAggregate {
    /// First three octets, e.g. `10.0.0`.
    pub prefix: String,
    pub count: usize,
}

/// Counts addresses per `/24`, largest first; ties are ordered by prefix.
pub fn subnets<'a, I>(ips: I) -> Vec<SubnetAggregate>
where
    I: IntoIterator<Item = &'a IpAddr>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for prefix in ips.into_iter().filter_map(ip::subnet_prefix) {
        *counts.entry(prefix).or_default() += 1;
    }

    let mut aggregates: Vec<SubnetAggregate> = counts
        .into_iter()
        .map(|(prefix, count)| SubnetAggregate { prefix, count })
        .collect();
    aggregates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.prefix.cmp(&b.prefix)));
    aggregates
}

/// Decides which resolved addresses are dropped from discovery results.
#[derive(Debug, Clone, Default)]
pub struct ExclusionPolicy {
    wildcard_ips: HashSet<IpAddr>,
    ignore_private: bool,
}

impl ExclusionPolicy {
    pub fn new(wildcard_ips: HashSet<IpAddr>, ignore_private: bool) -> Self {
        Self {
            wildcard_ips,
            ignore_private,
        }
    }

    pub fn excludes(&self, addr: &IpAddr) -> bool {
        self.wildcard_ips.contains(addr)
            || (self.ignore_private && ip::is_private(addr))
            || ip::is_broadcast(addr)
    }
}
