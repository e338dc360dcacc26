//! Task router for distributing transfer tasks to the worker pool.

use crate::transfer::TransferTask;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Distributes transfer tasks over a pool of workers.
///
/// Uses bounded channels so a slow pool applies backpressure to the
/// lister instead of letting tasks pile up in memory.
pub struct TaskRouter {
    /// Senders for each worker
    senders: Vec<mpsc::Sender<TransferTask>>,

    /// Round-robin counter for distribution
    next_worker: AtomicUsize,

    /// Whether the router is shutdown
    shutdown: AtomicBool,
}

impl TaskRouter {
    /// Create a router with the given pool size and per-worker buffer.
    pub fn new(
        num_workers: usize,
        buffer_size: usize,
    ) -> (Self, Vec<mpsc::Receiver<TransferTask>>) {
        let mut senders = Vec::with_capacity(num_workers);
        let mut receivers = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (tx, rx) = mpsc::channel(buffer_size);
            senders.push(tx);
            receivers.push(rx);
        }

        let router = Self {
            senders,
            next_worker: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        };

        (router, receivers)
    }

    /// Route a task to a worker using round-robin distribution.
    ///
    /// Returns `Err(task)` if the router is shutdown or the chosen
    /// worker's channel is closed.
    pub async fn route(&self, task: TransferTask) -> Result<(), TransferTask> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(task);
        }

        let worker_idx = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.senders.len();
        let sender = &self.senders[worker_idx];

        trace!(
            worker = worker_idx,
            key = %task.source_key,
            "Routing task to worker"
        );

        sender.send(task).await.map_err(|e| e.0)
    }

    /// Signal shutdown: `route` refuses new tasks afterwards.
    ///
    /// Dropping the router closes the worker channels, letting workers
    /// drain their buffers and exit.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        debug!("Task router shutdown signaled");
    }

    /// Check if the router is shutdown.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Get the number of workers.
    pub fn num_workers(&self) -> usize {
        self.senders.len()
    }
}
