//! Progress counters and the on-demand status seam.
//!
//! Workers bump counters as they go; the orchestrating task polls a
//! [`ProgressMonitor`] and, when the user asks for it, reports a
//! [`Snapshot`] without pausing anything in flight.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Non-blocking source of user requests during a long-running phase.
pub trait ProgressMonitor: Send + Sync {
    /// `true` if a status report was requested since the last poll.
    fn poll(&self) -> bool;

    /// `true` once the user asked the run to wind down.
    fn interrupted(&self) -> bool {
        false
    }
}

/// A monitor that never asks for anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl ProgressMonitor for NoopMonitor {
    fn poll(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolve,
    Scan,
    Takeover,
}

impl Phase {
    fn unit(self) -> &'static str {
        match self {
            Phase::Resolve | Phase::Takeover => "hosts",
            Phase::Scan => "ports",
        }
    }

    fn finding(self) -> &'static str {
        match self {
            Phase::Resolve => "discovered",
            Phase::Scan => "open",
            Phase::Takeover => "takeovers detected",
        }
    }
}

/// Counters shared by every task of one pipeline run.
#[derive(Debug)]
pub struct Progress {
    phase: Phase,
    started: Instant,
    total: usize,
    completed: AtomicUsize,
    found: AtomicUsize,
}

impl Progress {
    pub fn new(phase: Phase, total: usize) -> Self {
        Self {
            phase,
            started: Instant::now(),
            total,
            completed: AtomicUsize::new(0),
            found: AtomicUsize::new(0),
        }
    }

    pub fn complete_one(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a discovered host, an open port or a takeover, per phase.
    pub fn found_one(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            elapsed: self.started.elapsed(),
            completed: self.completed.load(Ordering::Relaxed),
            total: self.total,
            found: self.found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub elapsed: Duration,
    pub completed: usize,
    pub total: usize,
    pub found: usize,
}

impl Snapshot {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats: {} elapsed; {} out of {} {} checked ({} {}); {:.1}% done",
            format_elapsed(self.elapsed),
            self.completed,
            self.total,
            self.phase.unit(),
            self.found,
            self.phase.finding(),
            self.percent()
        )
    }
}

/// `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Marks a task complete when dropped, so panicking tasks are counted too.
pub(crate) struct CompletionGuard<'a>(pub &'a Progress);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.complete_one();
    }
}
