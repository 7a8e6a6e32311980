//! Orchestration of the Discover, Scan and Takeover pipelines.
//!
//! Every pipeline walks the same states:
//! `Init -> BuildCandidates -> Execute -> Filter -> Persist -> Done`.
//! `Init` fails fast on configuration faults and missing prerequisites, so
//! nothing is scheduled unless the run can complete. Tasks are shuffled
//! before scheduling to spread load over the target.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use hostmap_common::Result;
use hostmap_common::config::Config;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::pool::{PoolReport, TaskFault, WorkerPool};
use crate::progress::{CompletionGuard, NoopMonitor, Phase, Progress, ProgressMonitor};
use crate::rate::RateController;
use crate::reporter::{LogReporter, Reporter};
use crate::resolver::{DnsTransport, Resolver, UdpTransport, discover_nameservers};

mod discover;
mod scan;
mod takeover;

pub use discover::{DiscoverOutcome, Resolution, discover};
pub use scan::{ScanOutcome, scan};
pub use takeover::{TakeoverOutcome, takeover};

/// How often the orchestrator checks for status and interrupt requests.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    BuildCandidates,
    Execute,
    Filter,
    Persist,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::BuildCandidates => "build-candidates",
            Stage::Execute => "execute",
            Stage::Filter => "filter",
            Stage::Persist => "persist",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything a pipeline needs from the outside world.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub reporter: Arc<dyn Reporter>,
    pub monitor: Arc<dyn ProgressMonitor>,
    pub transport: Arc<dyn DnsTransport>,
    stop: Arc<AtomicBool>,
}

impl Context {
    /// A context querying real nameservers over UDP.
    pub fn new(config: Config, reporter: Arc<dyn Reporter>, monitor: Arc<dyn ProgressMonitor>) -> Self {
        Self {
            config: Arc::new(config),
            reporter,
            monitor,
            transport: Arc::new(UdpTransport),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn DnsTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Asks the running pipeline to wind down. Tasks already talking to the
    /// network finish; the rest are skipped and partial results persisted.
    pub fn interrupt(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// A handle for signal handlers that outlive a borrow of the context.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }
}

impl From<Config> for Context {
    fn from(config: Config) -> Self {
        Self::new(config, Arc::new(LogReporter), Arc::new(NoopMonitor))
    }
}

fn enter(stage: Stage, pipeline: &str) {
    debug!(pipeline, %stage, "entering stage");
}

/// One concurrent phase: a pool, its progress counters and the politeness
/// and interrupt plumbing wrapped around every task.
struct Run {
    pool: WorkerPool,
    progress: Arc<Progress>,
    rate: Option<RateController>,
    ctx: Context,
}

impl Run {
    fn start(ctx: &Context, phase: Phase, total: usize) -> Self {
        let rate = RateController::from_config(&ctx.config);
        if let Some(rate) = &rate {
            debug!(?rate, "rate limiting enabled, running a single worker");
        }
        Self {
            pool: WorkerPool::new(ctx.config.worker_count()),
            progress: Arc::new(Progress::new(phase, total)),
            rate,
            ctx: ctx.clone(),
        }
    }

    fn progress(&self) -> Arc<Progress> {
        self.progress.clone()
    }

    /// Schedules `tasks` in random order.
    fn schedule_all<T, F, Fut>(&self, mut tasks: Vec<T>, label: impl Fn(&T) -> String, make: F) -> Result<()>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        tasks.shuffle(&mut rand::rng());
        for item in tasks {
            let name = label(&item);
            self.schedule(name, make(item))?;
        }
        Ok(())
    }

    fn schedule<Fut>(&self, label: String, task: Fut) -> Result<()>
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let progress = self.progress.clone();
        let stop = self.ctx.stop.clone();
        let rate = self.rate;

        self.pool.schedule(label, async move {
            let _done = CompletionGuard(&progress);
            if stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            let result = task.await;
            if let Some(rate) = rate {
                rate.delay().await;
            }
            result
        })
    }

    /// Waits for the pool to drain, answering status requests meanwhile.
    async fn finish(self) -> Result<PoolReport> {
        let Run { pool, progress, ctx, .. } = self;
        let shutdown = pool.shutdown();
        tokio::pin!(shutdown);
        let mut tick = tokio::time::interval(POLL_INTERVAL);

        loop {
            tokio::select! {
                report = &mut shutdown => {
                    let report = report?;
                    report_faults(ctx.reporter.as_ref(), &report.faults);
                    return Ok(report);
                }
                _ = tick.tick() => {
                    if ctx.monitor.poll() {
                        ctx.reporter.status(&progress.snapshot());
                    }
                    if ctx.monitor.interrupted() && !ctx.stop.swap(true, Ordering::SeqCst) {
                        ctx.reporter.warning("Interrupted, waiting for running tasks to finish");
                    }
                }
            }
        }
    }
}

fn report_faults(reporter: &dyn Reporter, faults: &[TaskFault]) {
    if faults.is_empty() {
        return;
    }
    reporter.error(&format!("{} task(s) failed unexpectedly:", faults.len()));
    for fault in faults {
        reporter.error(&format!("  {}: {}", fault.task, fault.reason));
    }
}

/// The configured nameservers, or the zone's own when none are configured.
async fn build_resolver(ctx: &Context, zone: &str) -> Resolver {
    let cfg = ctx.config.as_ref();
    if !cfg.nameservers.is_empty() {
        return Resolver::with_config(ctx.transport.clone(), cfg.nameservers.clone(), cfg);
    }

    let bootstrap = Resolver::with_config(ctx.transport.clone(), Vec::new(), cfg);
    let found = discover_nameservers(&bootstrap, zone).await;
    if found.is_empty() {
        ctx.reporter
            .warning(&format!("No nameservers found for {zone}, using the fallback nameservers"));
        return bootstrap;
    }

    let listed: Vec<String> = found.iter().map(|ns| ns.ip().to_string()).collect();
    ctx.reporter.notice(&format!("Using nameservers {}", listed.join(", ")));
    Resolver::with_config(ctx.transport.clone(), found, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use crate::progress::Snapshot;
    use crate::assessment::TakeoverFinding;

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<Snapshot>>,
        warnings: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl Reporter for Recorder {
        fn notice(&self, _: &str) {}
        fn warning(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
        fn host_found(&self, _: &str, _: &std::net::IpAddr) {}
        fn port_open(&self, _: &std::net::IpAddr, _: u16, _: &[String]) {}
        fn takeover_found(&self, _: &TakeoverFinding) {}
        fn status(&self, snapshot: &Snapshot) {
            self.statuses.lock().unwrap().push(*snapshot);
        }
    }

    /// Requests a status once, then an interrupt.
    #[derive(Default)]
    struct Scripted {
        polls: AtomicUsize,
    }

    impl ProgressMonitor for Scripted {
        fn poll(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst) == 0
        }
        fn interrupted(&self) -> bool {
            self.polls.load(Ordering::SeqCst) > 1
        }
    }

    fn context(reporter: Arc<Recorder>, monitor: Arc<dyn ProgressMonitor>) -> Context {
        let config = Config {
            threads: 4,
            ..Config::default()
        };
        Context::new(config, reporter, monitor)
    }

    #[tokio::test]
    async fn every_task_counts_toward_progress() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(recorder.clone(), Arc::new(NoopMonitor));
        let run = Run::start(&ctx, Phase::Scan, 10);
        let progress = run.progress();

        let hits = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..10).collect();
        run.schedule_all(items, |i| format!("task {i}"), |_| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        })
        .unwrap();
        let report = run.finish().await.unwrap();

        assert_eq!(report.executed, 10);
        assert_eq!(hits.load(Ordering::SeqCst), 10);
        assert_eq!(progress.snapshot().completed, 10);
    }

    #[tokio::test]
    async fn interrupted_tasks_skip_their_work() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(recorder.clone(), Arc::new(NoopMonitor));
        ctx.interrupt();

        let run = Run::start(&ctx, Phase::Resolve, 5);
        let hits = Arc::new(AtomicUsize::new(0));
        run.schedule_all((0..5).collect(), |i: &i32| i.to_string(), |_| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        })
        .unwrap();
        run.finish().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn faults_are_reported_once_drained() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(recorder.clone(), Arc::new(NoopMonitor));
        let run = Run::start(&ctx, Phase::Scan, 1);
        run.schedule("probe 10.0.0.1:80".into(), async { Err::<(), _>(anyhow::anyhow!("boom")) })
            .unwrap();
        let report = run.finish().await.unwrap();

        assert_eq!(report.faults.len(), 1);
        let errors = recorder.errors.lock().unwrap();
        assert!(errors.iter().any(|e| e.contains("probe 10.0.0.1:80") && e.contains("boom")));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_runs_serialize_with_delays() {
        let recorder = Arc::new(Recorder::default());
        let config = Config {
            threads: 8,
            sleep: Some(Duration::from_secs(2)),
            jitter_percent: 0,
            ..Config::default()
        };
        let ctx = Context::new(config, recorder, Arc::new(NoopMonitor));
        let run = Run::start(&ctx, Phase::Scan, 3);
        assert_eq!(run.pool.size(), 1);

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let started = tokio::time::Instant::now();
        run.schedule_all(vec![1, 2, 3], |i: &i32| format!("task {i}"), |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        })
        .unwrap();
        let report = run.finish().await.unwrap();

        assert_eq!(report.executed, 3);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn monitor_requests_status_then_interrupt() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(recorder.clone(), Arc::new(Scripted::default()));
        let run = Run::start(&ctx, Phase::Resolve, 1);
        run.schedule("slow".into(), async {
            tokio::time::sleep(Duration::from_millis(700)).await;
            anyhow::Ok(())
        })
        .unwrap();
        run.finish().await.unwrap();

        assert_eq!(recorder.statuses.lock().unwrap().len(), 1);
        assert!(ctx.is_interrupted());
        assert_eq!(recorder.warnings.lock().unwrap().len(), 1);
    }
}
