use std::collections::HashSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use hostmap_common::Result;
use hostmap_common::validation::normalize_domain;
use hostmap_plugins::{Collector, CollectorContext, PluginError, Registry};
use tracing::debug;

use super::{Context, Run, Stage, build_resolver, enter};
use crate::aggregate::{self, ExclusionPolicy, SubnetAggregate};
use crate::assessment::{Assessment, HostMap};
use crate::pool::{TaskFault, lock};
use crate::progress::Phase;
use crate::wildcard::{WildcardFilter, WildcardReport};

const PIPELINE: &str = "discover";

/// A candidate and what it resolved to, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub host: String,
    pub ip: Option<IpAddr>,
}

#[derive(Debug)]
pub struct DiscoverOutcome {
    /// Surviving `host -> ip` pairs, as persisted.
    pub hosts: HostMap,
    pub wildcard: WildcardReport,
    pub subnets: Vec<SubnetAggregate>,
    pub candidates: usize,
    pub faults: Vec<TaskFault>,
    pub interrupted: bool,
    pub assessment_dir: PathBuf,
}

/// Resolves every candidate hostname of `domain` and persists the ones that
/// survive wildcard, private and broadcast filtering.
pub async fn discover(ctx: &Context, domain: &str, collectors: Registry<dyn Collector>) -> Result<DiscoverOutcome> {
    enter(Stage::Init, PIPELINE);
    let domain = normalize_domain(domain)?;
    let cfg = ctx.config.clone();
    cfg.validate()?;
    let assessment = Assessment::open(&cfg.output_root, &domain)?;
    let collectors = collectors.select(&cfg.only_collectors, &cfg.disable_collectors);
    let resolver = Arc::new(build_resolver(ctx, &domain).await);

    let wildcard = WildcardFilter::new(&resolver).detect(&domain).await;
    if wildcard.is_wildcard {
        ctx.reporter.warning(&format!(
            "{domain} has wildcard DNS, ignoring {} address(es)",
            wildcard.wildcard_ips.len()
        ));
    }

    enter(Stage::BuildCandidates, PIPELINE);
    let candidates = collect_candidates(ctx, &domain, &collectors).await;
    ctx.reporter
        .notice(&format!("Resolving {} candidate host(s) of {domain}", candidates.len()));

    enter(Stage::Execute, PIPELINE);
    let policy = Arc::new(ExclusionPolicy::new(
        wildcard.wildcard_ips.clone(),
        cfg.ignore_private,
    ));
    let resolutions: Arc<Mutex<Vec<Resolution>>> = Arc::default();
    let run = Run::start(ctx, Phase::Resolve, candidates.len());
    let progress = run.progress();
    let total = candidates.len();

    run.schedule_all(candidates, |host| format!("resolve {host}"), |host| {
        let resolver = resolver.clone();
        let policy = policy.clone();
        let resolutions = resolutions.clone();
        let progress = progress.clone();
        let reporter = ctx.reporter.clone();
        async move {
            let ip = resolver.resolve(&host).await;
            if let Some(ip) = ip.filter(|ip| !policy.excludes(ip)) {
                progress.found_one();
                reporter.host_found(&host, &ip);
            }
            lock(&resolutions).push(Resolution { host, ip });
            anyhow::Ok(())
        }
    })?;
    let report = run.finish().await?;

    enter(Stage::Filter, PIPELINE);
    let resolutions = std::mem::take(&mut *lock(&resolutions));
    let hosts = surviving_hosts(resolutions, &policy);
    let subnets = aggregate::subnets(hosts.values());

    enter(Stage::Persist, PIPELINE);
    assessment.write_hosts(&hosts)?;

    enter(Stage::Done, PIPELINE);
    Ok(DiscoverOutcome {
        hosts,
        wildcard,
        subnets,
        candidates: total,
        faults: report.faults,
        interrupted: ctx.is_interrupted(),
        assessment_dir: assessment.dir().to_path_buf(),
    })
}

/// The root domain plus every collector's output, normalized and deduplicated.
async fn collect_candidates(ctx: &Context, domain: &str, collectors: &Registry<dyn Collector>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::from([domain.to_string()]);
    let mut candidates = vec![domain.to_string()];
    let cctx = CollectorContext {
        domain,
        config: &ctx.config,
    };

    for collector in collectors.iter() {
        let names = match collector.run(&cctx).await {
            Ok(names) => names,
            Err(PluginError::MissingRequirement(reason)) => {
                ctx.reporter
                    .warning(&format!("Skipped collector {}: {reason}", collector.name()));
                continue;
            }
            Err(PluginError::Malfunction(reason)) => {
                ctx.reporter
                    .error(&format!("Collector {} failed: {reason}", collector.name()));
                continue;
            }
        };

        let before = candidates.len();
        for name in names {
            match normalize_domain(&name) {
                Ok(name) if seen.insert(name.clone()) => candidates.push(name),
                Ok(_) => {}
                Err(_) => debug!(collector = collector.name(), %name, "dropping invalid hostname"),
            }
        }
        debug!(
            collector = collector.name(),
            added = candidates.len() - before,
            "collector finished"
        );
    }

    candidates
}

fn surviving_hosts(resolutions: Vec<Resolution>, policy: &ExclusionPolicy) -> HostMap {
    resolutions
        .into_iter()
        .filter_map(|r| r.ip.filter(|ip| !policy.excludes(ip)).map(|ip| (r.host, ip)))
        .collect()
}
