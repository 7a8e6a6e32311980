//! # hostmap core
//!
//! The concurrent heart of hostmap: a worker pool, a DNS resolver with
//! primary/fallback nameserver sets, wildcard zone detection, TCP port
//! probing, politeness controls and the three orchestrating pipelines.
//!
//! * **[`pool`]**: fixed-size workers draining one shared queue.
//! * **[`resolver`]**: address and resource lookups, one UDP session per query.
//! * **[`wildcard`]**: probabilistic characterization of wildcard zones.
//! * **[`prober`]**: bounded TCP connect checks.
//! * **[`rate`]**: jittered inter-task delays.
//! * **[`progress`]**: counters and the on-demand status seam.
//! * **[`pipeline`]**: Discover, Scan and Takeover runs.

pub mod aggregate;
pub mod assessment;
pub mod pipeline;
pub mod pool;
pub mod prober;
pub mod progress;
pub mod rate;
pub mod reporter;
pub mod resolver;
pub mod urls;
pub mod wildcard;

pub use assessment::{Assessment, TakeoverFinding};
pub use pipeline::{Context, DiscoverOutcome, ScanOutcome, TakeoverOutcome, discover, scan, takeover};
pub use pool::{PoolReport, TaskFault, WorkerPool};
pub use progress::{NoopMonitor, ProgressMonitor, Snapshot};
pub use reporter::{LogReporter, Reporter};
pub use resolver::{DnsTransport, Resolver, UdpTransport};
