use std::sync::{Arc, Mutex};

use hostmap_common::Result;
use hostmap_common::validation::normalize_domain;
use hostmap_plugins::{DetectionContext, Detector, PluginError, Registry, Verdict};
use hostmap_protocols::DnsRecord;
use tracing::debug;

use super::{Context, Run, Stage, build_resolver, enter};
use crate::assessment::{Assessment, TakeoverFinding};
use crate::pool::{TaskFault, lock};
use crate::progress::Phase;
use crate::reporter::Reporter;

const PIPELINE: &str = "takeover";

#[derive(Debug)]
pub struct TakeoverOutcome {
    pub findings: Vec<TakeoverFinding>,
    /// Hosts whose resource was looked up.
    pub checked: usize,
    pub faults: Vec<TaskFault>,
    pub interrupted: bool,
}

impl TakeoverOutcome {
    pub fn vulnerable(&self) -> usize {
        self.findings.len()
    }

    pub fn not_vulnerable(&self) -> usize {
        self.checked.saturating_sub(self.findings.len())
    }
}

/// Runs every selected detector against each discovered host's CNAME or A
/// record, stopping per host at the first positive verdict.
pub async fn takeover(ctx: &Context, domain: &str, detectors: Registry<dyn Detector>) -> Result<TakeoverOutcome> {
    enter(Stage::Init, PIPELINE);
    let domain = normalize_domain(domain)?;
    let cfg = ctx.config.clone();
    cfg.validate()?;
    let assessment = Assessment::open(&cfg.output_root, &domain)?;
    let hosts = assessment.read_hosts()?;
    let detectors = Arc::new(detectors.select(&cfg.only_detectors, &cfg.disable_detectors));

    if detectors.is_empty() {
        ctx.reporter.warning("No takeover detectors selected, nothing to check");
        assessment.write_takeovers(&[])?;
        return Ok(TakeoverOutcome {
            findings: Vec::new(),
            checked: 0,
            faults: Vec::new(),
            interrupted: false,
        });
    }

    enter(Stage::BuildCandidates, PIPELINE);
    let resolver = Arc::new(build_resolver(ctx, &domain).await);
    let candidates: Vec<String> = hosts.into_keys().collect();
    ctx.reporter.notice(&format!(
        "Checking {} host(s) against {} detector(s)",
        candidates.len(),
        detectors.len()
    ));

    enter(Stage::Execute, PIPELINE);
    let findings: Arc<Mutex<Vec<TakeoverFinding>>> = Arc::default();
    let run = Run::start(ctx, Phase::Takeover, candidates.len());
    let progress = run.progress();
    let checked = candidates.len();

    run.schedule_all(candidates, |host| format!("takeover {host}"), |host| {
        let resolver = resolver.clone();
        let detectors = detectors.clone();
        let findings = findings.clone();
        let progress = progress.clone();
        let reporter = ctx.reporter.clone();
        async move {
            let resource = match resolver.resource(&host).await {
                Some(r @ (DnsRecord::Cname(_) | DnsRecord::A(_))) => r,
                _ => return anyhow::Ok(()),
            };
            if let Some(finding) = detect(&host, resource, &detectors, reporter.as_ref()).await {
                progress.found_one();
                reporter.takeover_found(&finding);
                lock(&findings).push(finding);
            }
            Ok(())
        }
    })?;
    let report = run.finish().await?;

    enter(Stage::Filter, PIPELINE);
    let mut findings = std::mem::take(&mut *lock(&findings));
    findings.sort_by(|a, b| a.host.cmp(&b.host));

    enter(Stage::Persist, PIPELINE);
    assessment.write_takeovers(&findings)?;

    enter(Stage::Done, PIPELINE);
    Ok(TakeoverOutcome {
        findings,
        checked,
        faults: report.faults,
        interrupted: ctx.is_interrupted(),
    })
}

/// Runs detectors in registry order until one answers positive.
async fn detect(
    host: &str,
    resource: DnsRecord,
    detectors: &Registry<dyn Detector>,
    reporter: &dyn Reporter,
) -> Option<TakeoverFinding> {
    let ctx = DetectionContext {
        host,
        resource: &resource,
    };

    for detector in detectors.iter() {
        match detector.run(&ctx).await {
            Ok(Verdict::Positive) => {
                return Some(TakeoverFinding {
                    host: host.to_string(),
                    info: detector.info(),
                    resource,
                });
            }
            Ok(Verdict::Negative) => {}
            Err(PluginError::MissingRequirement(reason)) => {
                debug!(detector = detector.name(), %host, "skipped: {reason}");
            }
            Err(PluginError::Malfunction(reason)) => {
                reporter.error(&format!("Detector {} failed on {host}: {reason}", detector.name()));
            }
        }
    }

    None
}
