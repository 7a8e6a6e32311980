use std::path::Path;
use std::time::Duration;

use colored::*;
use hostmap_core::aggregate::SubnetAggregate;
use hostmap_core::pool::TaskFault;

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

/// Subnets holding more than one host, largest first.
pub fn subnet_details(subnets: &[SubnetAggregate]) -> Vec<Detail> {
    subnets
        .iter()
        .filter(|s| s.count > 1)
        .map(|s| {
            let hosts = format!("{} hosts", s.count).color(colors::ACCENT);
            (format!("{}.0/24", s.prefix), hosts)
        })
        .collect()
}

pub fn elapsed(total: Duration) -> ColoredString {
    format!("{:.2}s", total.as_secs_f64()).bold().yellow()
}

pub fn output_dir(dir: &Path) {
    print::aligned_line("Results", dir.display().to_string());
}

pub fn faults(faults: &[TaskFault]) {
    if faults.is_empty() {
        return;
    }
    print::aligned_line("Failed tasks", faults.len().to_string().red().bold());
}

pub fn interrupted(interrupted: bool) {
    if interrupted {
        print::aligned_line("Interrupted", "partial results saved".yellow());
    }
}
