//! One-step clockwise rotation of a square matrix, ring by ring.
//!
//! # Algorithm Overview
//!
//! 1. **Validation**: the matrix must be present and square. This is checked
//!    once when the [`Rotator`] is built; the matrix cannot change shape
//!    afterwards.
//!
//! 2. **Decomposition**: each rotation splits the matrix into its `n / 2`
//!    concentric rings and creates one [`RingJob`] per ring.
//!
//! 3. **Dispatch**: the jobs go to the rotator's [`RingExecutor`]. Rings are
//!    cell-disjoint, so they may run in any order and in parallel.
//!
//! 4. **Ring shift**: each job moves every cell of its ring one position
//!    clockwise, using a single temporary element.
//!
//! Calling [`Rotator::rotate`] `k` times rotates `k` steps. A ring of side
//! `count` returns to its starting arrangement after `4 * (count - 1)` steps.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::executor::{RingExecutor, ThreadedExecutor};
use crate::matrix::{Matrix, MatrixStorage};
use crate::ring::RingJob;

/// Parameter name reported by construction errors.
pub(crate) const MATRIX_PARAMETER: &str = "matrix";

/// Rotates a square matrix clockwise, in place.
///
/// The rotator holds the matrix storage for its whole lifetime: either a
/// `&mut Matrix<T>` borrowed from the caller, or an owned `Matrix<T>` /
/// `Box<Matrix<T>>` handed back by [`into_inner`](Rotator::into_inner).
/// Elements are never copied into another buffer.
///
/// # Example
///
/// ```
/// use ring_rotator::{Matrix, Rotator};
///
/// let mut matrix = Matrix::from([[1, 2], [4, 3]]);
/// let mut rotator = Rotator::new(&mut matrix)?;
/// rotator.rotate()?;
/// assert_eq!(matrix, Matrix::from([[4, 1], [3, 2]]));
/// # Ok::<(), ring_rotator::Error>(())
/// ```
#[derive(Debug)]
pub struct Rotator<M, E = ThreadedExecutor> {
    matrix: M,
    executor: E,
}

impl<M> Rotator<M>
where
    M: MatrixStorage,
{
    /// Validates `matrix` and rotates it with a default [`ThreadedExecutor`].
    pub fn new(matrix: M) -> Result<Self> {
        Self::from_option(Some(matrix), ThreadedExecutor::default())
    }
}

impl<M, E> Rotator<M, E>
where
    M: MatrixStorage,
    E: RingExecutor,
{
    /// Validates `matrix` and rotates it with `executor`.
    pub fn with_executor(matrix: M, executor: E) -> Result<Self> {
        Self::from_option(Some(matrix), executor)
    }

    /// Validates a possibly absent `matrix`.
    ///
    /// Fails with [`Error::NullMatrix`] when `matrix` is `None` and with
    /// [`Error::ShapeMismatch`] when its row and column counts differ.
    pub fn from_option(matrix: Option<M>, executor: E) -> Result<Self> {
        let matrix = matrix.ok_or(Error::NullMatrix {
            parameter: MATRIX_PARAMETER,
        })?;

        let grid = matrix.matrix();
        if !grid.is_square() {
            return Err(Error::ShapeMismatch {
                parameter: MATRIX_PARAMETER,
                rows: grid.rows(),
                columns: grid.columns(),
            });
        }

        Ok(Self { matrix, executor })
    }

    /// The matrix, as rotated so far.
    pub fn matrix(&self) -> &Matrix<M::Elem> {
        self.matrix.matrix()
    }

    /// Side length of the square matrix.
    pub fn side(&self) -> usize {
        self.matrix.matrix().rows()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Releases the matrix storage.
    pub fn into_inner(self) -> M {
        self.matrix
    }

    /// Rotates the matrix one step clockwise.
    ///
    /// 0x0 and 1x1 matrices have no rings and are left untouched. Fails with
    /// [`Error::ShapeMismatch`] if the storage no longer hands out a square
    /// matrix, or with the executor's error if it could not complete every
    /// ring (e.g. a worker thread panicked).
    pub fn rotate(&mut self) -> Result<()>
    where
        M::Elem: Send,
    {
        let grid = self.matrix.matrix_mut();
        let side = grid.rows();
        let jobs = RingJob::split(grid)?;
        if jobs.is_empty() {
            return Ok(());
        }

        debug!(
            side,
            rings = jobs.len(),
            executor = self.executor.name(),
            "rotating matrix"
        );
        self.executor.execute(jobs)
    }
}

impl<M, E> Rotator<M, E>
where
    M: MatrixStorage + Send + 'static,
    M::Elem: Send,
    E: RingExecutor + Send + 'static,
{
    /// Starts [`rotate`](Rotator::rotate) on tokio's blocking pool and returns
    /// without waiting for it.
    ///
    /// The returned [`RotateTask`] resolves to the rotator once the rotation
    /// has finished, or to the error that stopped it. Called outside a tokio
    /// runtime, nothing is spawned and the task resolves to
    /// [`Error::NoRuntime`].
    pub fn rotate_async(self) -> RotateTask<M, E> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(error = %err, "rotate_async called outside a tokio runtime");
                return RotateTask {
                    state: TaskState::Rejected(Some(Error::NoRuntime(err.to_string()))),
                };
            }
        };

        let mut rotator = self;
        let handle = runtime.spawn_blocking(move || rotator.rotate().map(|()| rotator));
        RotateTask {
            state: TaskState::Running(handle),
        }
    }
}

/// A rotation running in the background. See [`Rotator::rotate_async`].
#[derive(Debug)]
#[must_use = "the rotator is only handed back by awaiting the task"]
pub struct RotateTask<M, E> {
    state: TaskState<M, E>,
}

#[derive(Debug)]
enum TaskState<M, E> {
    Running(JoinHandle<Result<Rotator<M, E>>>),
    /// Never started; holds the error until the task is polled.
    Rejected(Option<Error>),
}

impl<M, E> RotateTask<M, E> {
    /// Returns true once the rotation has completed or failed.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            TaskState::Running(handle) => handle.is_finished(),
            TaskState::Rejected(_) => true,
        }
    }
}

impl<M, E> Future for RotateTask<M, E> {
    type Output = Result<Rotator<M, E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            TaskState::Running(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|err| Err(Error::TaskJoin(err.to_string())))
            }),
            TaskState::Rejected(err) => match err.take() {
                Some(err) => Poll::Ready(Err(err)),
                None => panic!("`RotateTask` polled after completion"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SequentialExecutor;

    #[test]
    fn test_null_matrix_message() {
        let err = Rotator::from_option(None::<Matrix<i32>>, SequentialExecutor).unwrap_err();
        assert_eq!(
            err,
            Error::NullMatrix {
                parameter: "matrix"
            }
        );
        assert_eq!(err.to_string(), "Parameter \"matrix\" can't be null.");
    }

    #[test]
    fn test_shape_mismatch_message() {
        let mut matrix = Matrix::from([[1, 2], [3, 4], [5, 6]]);
        let err = Rotator::new(&mut matrix).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter \"matrix\" must have the same number of columns and rows, but it has 3 rows and 2 columns."
        );
    }

    #[test]
    fn test_side_and_into_inner() {
        let matrix = Matrix::from([[1, 2, 3], [8, 9, 4], [7, 6, 5]]);
        let mut rotator = Rotator::with_executor(matrix, SequentialExecutor).expect("square");
        assert_eq!(rotator.side(), 3);
        rotator.rotate().expect("rotate");
        let matrix = rotator.into_inner();
        assert_eq!(matrix.row(1), &[7, 9, 3]);
    }

    #[test]
    fn test_empty_matrix_is_noop() {
        let mut rotator = Rotator::new(Matrix::<u8>::new_empty()).expect("square");
        rotator.rotate().expect("rotate");
        assert!(rotator.matrix().is_empty());
        assert_eq!(rotator.executor().name(), "threaded");
    }

    #[test]
    fn test_rotate_async_without_runtime() {
        let rotator = Rotator::with_executor(Matrix::from([[1, 2], [4, 3]]), SequentialExecutor)
            .expect("square");
        let task = rotator.rotate_async();
        assert!(task.is_finished());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let err = runtime.block_on(task).unwrap_err();
        assert!(matches!(err, Error::NoRuntime(_)), "unexpected error {err:?}");
    }
}
