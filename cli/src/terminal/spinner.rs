use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub const INPUT_TIP: &str = "press Enter for status, q + Enter to stop early";

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS)
}

/// A span rendered as a spinner for as long as a pipeline instruments it.
pub fn phase_span(message: &str, show_tip: bool) -> Span {
    let span = info_span!("phase", indicatif.pb_show = true);
    span.pb_set_style(&style());
    let message = if show_tip {
        format!("{message} ({INPUT_TIP})")
    } else {
        message.to_string()
    };
    span.pb_set_message(&message);
    span
}
