//! # Verification Pool
//!
//! Fixed-size rayon pool for CPU-bound signature checks.
//!
//! Work is split ahead of time into contiguous chunks, one per worker, since
//! every key costs the same to verify. Each chunk reports back through a
//! oneshot channel; a chunk whose worker dies without reporting fails the
//! whole batch instead of silently dropping keys.

use crate::domain::errors::{ValidationError, ValidationResult};
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error};

/// Split `len` items into at most `workers` contiguous ranges.
///
/// Every index lands in exactly one range, in order. Ranges differ in length
/// by at most one chunk's remainder.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let workers = workers.clamp(1, len);
    let chunk_size = len.div_ceil(workers);

    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}

/// A fixed-size worker pool with static partitioning.
pub struct VerificationPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl VerificationPool {
    /// Create a pool with `workers` threads.
    ///
    /// # Errors
    /// * `PoolInit` if the threads cannot be spawned
    pub fn new(workers: usize) -> ValidationResult<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("deposit-verify-{i}"))
            .panic_handler(|_| error!("Verification worker panicked"))
            .build()
            .map_err(|e| ValidationError::PoolInit(e.to_string()))?;

        Ok(Self { pool, workers })
    }

    /// Create a pool sized to the available cores.
    pub fn with_available_cores() -> ValidationResult<Self> {
        Self::new(num_cpus::get())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` over every item, returning results in input order.
    ///
    /// # Errors
    /// * `WorkerFailure` if any chunk's worker panics
    pub async fn run<T, R, F>(&self, items: Vec<T>, job: F) -> ValidationResult<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let total = items.len();
        let ranges = partition(total, self.workers);
        let job = Arc::new(job);

        let mut chunks = Vec::with_capacity(ranges.len());
        let mut rest = items;
        for range in ranges.iter().rev() {
            chunks.push(rest.split_off(range.start));
        }
        chunks.reverse();

        let mut receivers = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let (tx, rx) = oneshot::channel();
            let job = Arc::clone(&job);
            self.pool.spawn(move || {
                let results: Vec<R> = chunk.into_iter().map(|item| job(item)).collect();
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(results);
            });
            receivers.push(rx);
        }

        debug!(items = total, chunks = receivers.len(), "Verification batch dispatched");

        let mut results = Vec::with_capacity(total);
        for (chunk, rx) in receivers.into_iter().enumerate() {
            let part = rx
                .await
                .map_err(|_| ValidationError::WorkerFailure { chunk })?;
            results.extend(part);
        }

        Ok(results)
    }
}
