//! Shared helpers for benchmark drivers.

use std::num::NonZeroUsize;

use crate::{Matrix, ThreadedExecutor};

pub const BENCH_SIZES: [usize; 5] = [256, 512, 1024, 2048, 4096];
pub const BENCH_THREADS: [usize; 4] = [1, 2, 4, 8];

/// Builds a `side x side` matrix holding `0..side * side` in row-major order.
pub fn create_test_matrix(side: usize) -> Matrix<u32> {
    Matrix::from_fn(side, side, |row, column| (row * side + column) as u32)
}

/// A threaded executor that spawns a worker per ring up to `threads`.
pub fn eager_executor(threads: usize) -> ThreadedExecutor {
    let threads = NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN);
    let mut executor = ThreadedExecutor::with_threads(threads);
    executor.set_min_cells_per_thread(1);
    executor
}
