use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use hostmap_common::Result;
use hostmap_common::validation::normalize_domain;

use super::{Context, Run, Stage, enter};
use crate::assessment::{Assessment, HostMap, PortMap};
use crate::pool::{TaskFault, lock};
use crate::progress::Phase;
use crate::prober;
use crate::urls::make_url;

const PIPELINE: &str = "scan";

#[derive(Debug)]
pub struct ScanOutcome {
    pub open_ports: PortMap,
    pub urls: BTreeSet<String>,
    /// Number of `ip:port` pairs probed.
    pub probes: usize,
    pub faults: Vec<TaskFault>,
    pub interrupted: bool,
}

/// Probes every configured port on every address found by discovery.
pub async fn scan(ctx: &Context, domain: &str) -> Result<ScanOutcome> {
    enter(Stage::Init, PIPELINE);
    let domain = normalize_domain(domain)?;
    let cfg = ctx.config.clone();
    cfg.validate()?;
    let assessment = Assessment::open(&cfg.output_root, &domain)?;
    let hosts = assessment.read_hosts()?;

    enter(Stage::BuildCandidates, PIPELINE);
    let domains = Arc::new(domains_by_ip(&hosts));
    let targets: Vec<(IpAddr, u16)> = domains
        .keys()
        .flat_map(|ip| cfg.ports.iter().map(move |port| (*ip, *port)))
        .collect();
    ctx.reporter.notice(&format!(
        "Scanning {} port(s) on {} address(es)",
        cfg.ports.len(),
        domains.len()
    ));

    enter(Stage::Execute, PIPELINE);
    let open: Arc<Mutex<PortMap>> = Arc::default();
    let run = Run::start(ctx, Phase::Scan, targets.len());
    let progress = run.progress();
    let probes = targets.len();
    let limit = cfg.probe_timeout;

    run.schedule_all(targets, |(ip, port)| format!("probe {ip}:{port}"), |(ip, port)| {
        let open = open.clone();
        let domains = domains.clone();
        let progress = progress.clone();
        let reporter = ctx.reporter.clone();
        async move {
            let is_open = prober::probe(ip, port, limit)
                .await
                .with_context(|| format!("unexpected error probing {ip}:{port}"))?;
            if is_open {
                lock(&open).entry(ip).or_default().insert(port);
                progress.found_one();
                let names = domains.get(&ip).map(Vec::as_slice).unwrap_or_default();
                reporter.port_open(&ip, port, names);
            }
            anyhow::Ok(())
        }
    })?;
    let report = run.finish().await?;

    enter(Stage::Filter, PIPELINE);
    let open_ports = std::mem::take(&mut *lock(&open));
    let urls = urls_for(&open_ports, &domains);

    enter(Stage::Persist, PIPELINE);
    assessment.write_open_ports(&open_ports)?;
    assessment.write_urls(&urls)?;

    enter(Stage::Done, PIPELINE);
    Ok(ScanOutcome {
        open_ports,
        urls,
        probes,
        faults: report.faults,
        interrupted: ctx.is_interrupted(),
    })
}

/// Inverts `host -> ip` so each address is probed once.
fn domains_by_ip(hosts: &HostMap) -> BTreeMap<IpAddr, Vec<String>> {
    let mut by_ip: BTreeMap<IpAddr, Vec<String>> = BTreeMap::new();
    for (host, ip) in hosts {
        by_ip.entry(*ip).or_default().push(host.clone());
    }
    by_ip
}

fn urls_for(open_ports: &PortMap, domains: &BTreeMap<IpAddr, Vec<String>>) -> BTreeSet<String> {
    let mut urls = BTreeSet::new();
    for (ip, ports) in open_ports {
        for host in domains.get(ip).into_iter().flatten() {
            for port in ports {
                urls.insert(make_url(host, *port));
            }
        }
    }
    urls
}
