use std::time::Instant;

use colored::*;
use hostmap_core::{Context, DiscoverOutcome};
use hostmap_plugins::default_collectors;
use tracing::Instrument;

use crate::hprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(ctx: &Context, domain: &str, show_tip: bool) -> anyhow::Result<()> {
    let span = spinner::phase_span(&format!("Resolving hosts of {domain}"), show_tip);
    let started = Instant::now();

    let outcome = hostmap_core::discover(ctx, domain, default_collectors())
        .instrument(span)
        .await?;

    discovery_ends(&outcome, started);
    Ok(())
}

fn discovery_ends(outcome: &DiscoverOutcome, started: Instant) {
    hprint!();
    if outcome.hosts.is_empty() {
        print::header("zero hosts found");
        print::no_results();
    } else {
        let subnets = format::subnet_details(&outcome.subnets);
        if !subnets.is_empty() {
            print::header("subnets");
            print::as_tree_one_level(&subnets);
        }
    }

    print::header("summary");
    print::aligned_line("Candidates", outcome.candidates.to_string());
    if outcome.wildcard.is_wildcard {
        let ips: Vec<String> = outcome.wildcard.wildcard_ips.iter().map(ToString::to_string).collect();
        print::aligned_line("Wildcard IPs", ips.join(", ").yellow());
    }
    format::faults(&outcome.faults);
    format::interrupted(outcome.interrupted);
    format::output_dir(&outcome.assessment_dir);

    let found: ColoredString = format!("{} hosts", outcome.hosts.len()).bold().green();
    let line: ColoredString = format!("Discovery complete: {found} found in {}", format::elapsed(started.elapsed()))
        .color(colors::TEXT_DEFAULT);
    print::fat_separator();
    print::centerln(&line.to_string());
}
