//! Executors that run the ring jobs of one rotation.
//!
//! A rotation hands its executor one [`RingJob`] per ring. Jobs are
//! independent, so an executor may run them in any order and on any thread,
//! as long as every job has finished (or failed) before `execute` returns.
//!
//! - [`SequentialExecutor`] runs them one after another on the caller's
//!   thread, which keeps tests deterministic.
//! - [`ThreadedExecutor`] fans them out over scoped worker threads that are
//!   created for the call and joined before it returns. There is no global
//!   pool.

use std::any::Any;
use std::num::NonZeroUsize;
use std::thread;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::ring::RingJob;

/// Runs the ring jobs of a single rotation.
pub trait RingExecutor {
    /// Runs every job to completion.
    ///
    /// Returns an error if any job could not be completed. Implementations
    /// must not return before all jobs they started have stopped.
    fn execute<T: Send>(&self, jobs: Vec<RingJob<'_, T>>) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Runs ring jobs in order on the calling thread.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SequentialExecutor;

impl RingExecutor for SequentialExecutor {
    fn execute<T: Send>(&self, jobs: Vec<RingJob<'_, T>>) -> Result<()> {
        jobs.into_iter().for_each(RingJob::rotate);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Minimum number of ring cells per worker before another thread is spawned.
///
/// Rotating a ring is a handful of moves per cell, so small matrices finish
/// faster inline than it takes to start a thread.
const DEFAULT_MIN_CELLS_PER_THREAD: usize = 4096;

/// Fans ring jobs out over scoped worker threads.
///
/// The worker count is the smallest of the configured thread count, the
/// number of rings, and the total ring cell count divided by
/// `min_cells_per_thread`. With a single worker the jobs run inline.
/// Jobs are dealt round-robin, outermost ring first, so the long outer rings
/// spread across workers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThreadedExecutor {
    threads: NonZeroUsize,
    min_cells_per_thread: usize,
}

impl Default for ThreadedExecutor {
    fn default() -> Self {
        let threads = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self::with_threads(threads)
    }
}

impl ThreadedExecutor {
    /// Uses all available hardware threads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses at most `threads` worker threads.
    pub fn with_threads(threads: NonZeroUsize) -> Self {
        Self {
            threads,
            min_cells_per_thread: DEFAULT_MIN_CELLS_PER_THREAD,
        }
    }

    /// Sets the maximum number of worker threads.
    pub fn set_threads(&mut self, threads: NonZeroUsize) -> &mut Self {
        self.threads = threads;
        self
    }

    /// Sets how many ring cells a worker must have before another one is
    /// added. `0` is treated as `1`, which spawns up to one worker per ring.
    pub fn set_min_cells_per_thread(&mut self, cells: usize) -> &mut Self {
        self.min_cells_per_thread = cells.max(1);
        self
    }

    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    pub fn min_cells_per_thread(&self) -> usize {
        self.min_cells_per_thread
    }

    /// Number of workers used for jobs totalling `cells` ring cells.
    pub(crate) fn worker_count(&self, jobs: usize, cells: usize) -> usize {
        let by_work = (cells / self.min_cells_per_thread).max(1);
        self.threads.get().min(jobs).min(by_work).max(1)
    }

    /// Deals `jobs` round-robin over the workers and runs `run` on each.
    ///
    /// Every worker is joined before returning. The first panicking worker,
    /// by worker index, is reported as [`Error::WorkerPanicked`].
    fn fan_out<J, F>(&self, jobs: Vec<J>, cells: usize, run: F) -> Result<()>
    where
        J: Send,
        F: Fn(J) + Sync,
    {
        let workers = self.worker_count(jobs.len(), cells);
        if workers <= 1 {
            jobs.into_iter().for_each(run);
            return Ok(());
        }

        let mut batches: Vec<Vec<J>> = (0..workers).map(|_| Vec::new()).collect();
        for (index, job) in jobs.into_iter().enumerate() {
            batches[index % workers].push(job);
        }

        let run = &run;
        let outcomes: Vec<thread::Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = batches
                .into_iter()
                .enumerate()
                .map(|(worker, batch)| {
                    scope.spawn(move || {
                        trace!(worker, rings = batch.len(), "ring worker started");
                        batch.into_iter().for_each(run);
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut failure = None;
        for (worker, outcome) in outcomes.into_iter().enumerate() {
            if let Err(payload) = outcome {
                let message = panic_message(payload.as_ref());
                warn!(worker, %message, "ring worker panicked");
                if failure.is_none() {
                    failure = Some(Error::WorkerPanicked { worker, message });
                }
            }
        }
        failure.map_or(Ok(()), Err)
    }
}

impl RingExecutor for ThreadedExecutor {
    fn execute<T: Send>(&self, jobs: Vec<RingJob<'_, T>>) -> Result<()> {
        let cells = jobs.iter().map(|job| job.ring().cycle_length()).sum();
        self.fan_out(jobs, cells, RingJob::rotate)
    }

    fn name(&self) -> &'static str {
        "threaded"
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
