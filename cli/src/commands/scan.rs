use std::time::Instant;

use colored::*;
use hostmap_core::{Context, ScanOutcome};
use tracing::Instrument;

use crate::hprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn scan(ctx: &Context, domain: &str, show_tip: bool) -> anyhow::Result<()> {
    let span = spinner::phase_span(&format!("Probing ports of {domain}"), show_tip);
    let started = Instant::now();

    let outcome = hostmap_core::scan(ctx, domain).instrument(span).await?;

    scan_ends(&outcome, started);
    Ok(())
}

fn scan_ends(outcome: &ScanOutcome, started: Instant) {
    hprint!();
    if outcome.urls.is_empty() {
        print::header("no open ports");
        print::no_results();
    } else {
        print::header("urls");
        for url in &outcome.urls {
            print::print_status(url.color(colors::URL).to_string());
        }
    }

    print::header("summary");
    print::aligned_line("Probes", outcome.probes.to_string());
    print::aligned_line("Addresses", outcome.open_ports.len().to_string());
    format::faults(&outcome.faults);
    format::interrupted(outcome.interrupted);

    let open: usize = outcome.open_ports.values().map(|ports| ports.len()).sum();
    let found: ColoredString = format!("{open} open ports").bold().green();
    let line: ColoredString = format!("Scan complete: {found} found in {}", format::elapsed(started.elapsed()))
        .color(colors::TEXT_DEFAULT);
    print::fat_separator();
    print::centerln(&line.to_string());
}
