use std::time::Instant;

use colored::*;
use hostmap_core::{Context, TakeoverOutcome};
use hostmap_plugins::default_detectors;
use tracing::Instrument;

use crate::hprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn takeover(ctx: &Context, domain: &str, show_tip: bool) -> anyhow::Result<()> {
    let span = spinner::phase_span(&format!("Checking {domain} for takeovers"), show_tip);
    let started = Instant::now();

    let outcome = hostmap_core::takeover(ctx, domain, default_detectors())
        .instrument(span)
        .await?;

    takeover_ends(&outcome, started);
    Ok(())
}

fn takeover_ends(outcome: &TakeoverOutcome, started: Instant) {
    hprint!();
    for (idx, finding) in outcome.findings.iter().enumerate() {
        print::header(&format!("takeover {}", idx + 1));
        print::as_tree_one_level(&[
            ("Host".to_string(), finding.host.color(colors::HOSTNAME)),
            ("Service".to_string(), finding.info.service.color(colors::ACCENT)),
            ("Website".to_string(), finding.info.service_website.normal()),
            (
                "Resource".to_string(),
                format!("{} {}", finding.resource.kind(), finding.resource.value()).normal(),
            ),
        ]);
    }

    print::header("summary");
    print::aligned_line("Vulnerable", outcome.vulnerable().to_string().color(colors::VULNERABLE));
    print::aligned_line("Not vulnerable", outcome.not_vulnerable().to_string().green());
    format::faults(&outcome.faults);
    format::interrupted(outcome.interrupted);

    let line: ColoredString = format!(
        "Takeover check complete: {} hosts checked in {}",
        outcome.checked.to_string().bold(),
        format::elapsed(started.elapsed())
    )
    .color(colors::TEXT_DEFAULT);
    print::fat_separator();
    print::centerln(&line.to_string());
}
