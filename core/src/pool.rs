//! A fixed-size pool of async workers draining one shared task queue.
//!
//! Submission into the queue is FIFO, but with more than one worker the
//! execution and completion order is unspecified. Each worker runs its tasks
//! strictly one after another.
//!
//! A task that returns an error or panics is recorded as a [`TaskFault`]
//! against its label; the worker keeps going.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hostmap_common::{Error, Result};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error};

type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

struct Job {
    label: String,
    task: TaskFuture,
}

/// A task that failed unexpectedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFault {
    pub task: String,
    pub reason: String,
}

/// Returned by [`WorkerPool::shutdown`].
#[derive(Debug, Default)]
pub struct PoolReport {
    pub executed: usize,
    pub faults: Vec<TaskFault>,
}

#[derive(Default)]
struct Shared {
    executed: AtomicUsize,
    faults: Mutex<Vec<TaskFault>>,
}

impl Shared {
    fn record_fault(&self, task: String, reason: String) {
        error!(task = %task, "task failed: {reason}");
        lock(&self.faults).push(TaskFault { task, reason });
    }
}

pub struct WorkerPool {
    size: usize,
    queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime. A size of zero is
    /// treated as one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(AsyncMutex::new(rx));
        let shared = Arc::new(Shared::default());

        let workers = (0..size)
            .map(|id| tokio::spawn(work(id, rx.clone(), shared.clone())))
            .collect();

        debug!(size, "worker pool started");
        Self {
            size,
            queue: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            shared,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Enqueues `task` under `label`. Never waits for a worker.
    ///
    /// Fails with [`Error::PoolClosed`] once [`shutdown`](Self::shutdown) has begun.
    pub fn schedule<F>(&self, label: impl Into<String>, task: F) -> Result<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let queue = lock(&self.queue);
        let sender = queue.as_ref().ok_or(Error::PoolClosed)?;
        sender
            .send(Job {
                label: label.into(),
                task: Box::pin(task),
            })
            .map_err(|_| Error::PoolClosed)
    }

    /// Stops accepting tasks, lets the workers drain the queue, and waits for
    /// every worker to exit. Every task scheduled before this call has run
    /// exactly once when it returns.
    pub async fn shutdown(&self) -> Result<PoolReport> {
        let sender = lock(&self.queue).take().ok_or(Error::PoolClosed)?;
        drop(sender);

        let workers = std::mem::take(&mut *lock(&self.workers));
        for worker in workers {
            if let Err(e) = worker.await {
                error!("worker terminated abnormally: {e}");
            }
        }

        let faults = std::mem::take(&mut *lock(&self.shared.faults));
        Ok(PoolReport {
            executed: self.shared.executed.load(Ordering::SeqCst),
            faults,
        })
    }
}

async fn work(id: usize, queue: Arc<AsyncMutex<mpsc::UnboundedReceiver<Job>>>, shared: Arc<Shared>) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(Job { label, task }) = next else {
            break;
        };

        // Spawned so a panic is contained to the task.
        match tokio::spawn(task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => shared.record_fault(label, format!("{e:#}")),
            Err(e) if e.is_panic() => shared.record_fault(label, panic_message(e.into_panic())),
            Err(e) => shared.record_fault(label, e.to_string()),
        }
        shared.executed.fetch_add(1, Ordering::SeqCst);
    }
    debug!(worker = id, "queue closed, worker exiting");
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_task_runs_exactly_once() {
        for size in [1, 2, 3, 8, 17, 64] {
            for n in [0usize, 1, 10, 250] {
                let pool = WorkerPool::new(size);
                let counter = Arc::new(AtomicUsize::new(0));
                for i in 0..n {
                    let counter = counter.clone();
                    pool.schedule(format!("task-{i}"), async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        anyhow::Ok(())
                    })
                    .unwrap();
                }
                let report = pool.shutdown().await.unwrap();
                assert_eq!(counter.load(Ordering::SeqCst), n, "size={size} n={n}");
                assert_eq!(report.executed, n);
                assert!(report.faults.is_empty());
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_waits_for_slow_tasks() {
        let pool = WorkerPool::new(2);
        let done = Arc::new(AtomicUsize::new(0));
        for i in 0..6 {
            let done = done.clone();
            pool.schedule(format!("slow-{i}"), async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            })
            .unwrap();
        }
        pool.shutdown().await.unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn schedule_after_shutdown_is_pool_closed() {
        let pool = WorkerPool::new(4);
        pool.shutdown().await.unwrap();
        let err = pool.schedule("late", async { anyhow::Ok(()) }).unwrap_err();
        assert!(matches!(err, Error::PoolClosed));
        assert!(matches!(pool.shutdown().await, Err(Error::PoolClosed)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn faults_are_recorded_and_workers_survive() {
        let pool = WorkerPool::new(1);
        let after = Arc::new(AtomicBool::new(false));

        pool.schedule("fails", async { Err::<(), _>(anyhow::anyhow!("boom")) }).unwrap();
        pool.schedule("panics", async {
            if true {
                panic!("kaboom");
            }
            anyhow::Ok(())
        }).unwrap();
        let flag = after.clone();
        pool.schedule("after", async move {
            flag.store(true, Ordering::SeqCst);
            anyhow::Ok(())
        })
        .unwrap();

        let report = pool.shutdown().await.unwrap();
        assert!(after.load(Ordering::SeqCst), "worker died after a fault");
        assert_eq!(report.executed, 3);
        assert_eq!(report.faults.len(), 2);
        assert_eq!(report.faults[0], TaskFault { task: "fails".into(), reason: "boom".into() });
        assert_eq!(report.faults[1].task, "panics");
        assert!(report.faults[1].reason.contains("kaboom"));
    }

    #[tokio::test]
    async fn single_worker_runs_in_submission_order() {
        let pool = WorkerPool::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..20 {
            let seen = seen.clone();
            pool.schedule(i.to_string(), async move {
                tokio::task::yield_now().await;
                lock(&seen).push(i);
                anyhow::Ok(())
            })
            .unwrap();
        }
        pool.shutdown().await.unwrap();
        assert_eq!(*lock(&seen), (0..20).collect::<Vec<_>>());
    }
}
