//! In-place clockwise rotation of square matrices, one ring at a time.
//!
//! # Ring Design
//!
//! A square matrix is peeled into concentric rings ([`Ring`]). Rotating the
//! matrix one step clockwise is the same as rotating every ring one cell
//! along its own border, and since rings share no cells those rotations are
//! independent units of work.
//!
//! - [`Rotator`] validates the matrix once and performs the rotation,
//!   synchronously ([`Rotator::rotate`]) or in the background
//!   ([`Rotator::rotate_async`]).
//! - A [`RingExecutor`] decides how the per-ring jobs run:
//!   [`ThreadedExecutor`] (default) spreads them over scoped threads,
//!   [`SequentialExecutor`] runs them inline.
//!
//! # Example
//!
//! ```
//! use ring_rotator::{Matrix, Rotator, SequentialExecutor};
//!
//! let mut matrix = Matrix::from([
//!     [1, 2, 3],
//!     [8, 9, 4],
//!     [7, 6, 5],
//! ]);
//!
//! let mut rotator = Rotator::with_executor(&mut matrix, SequentialExecutor)?;
//! rotator.rotate()?;
//!
//! assert_eq!(matrix.to_string(), "8 1 2\n7 9 3\n6 5 4");
//! # Ok::<(), ring_rotator::Error>(())
//! ```

#[doc(hidden)]
pub mod bench_utils;
mod error;
mod executor;
mod matrix;
mod ring;
mod rotator;

pub use crate::error::{Error, Result};
pub use crate::executor::{RingExecutor, SequentialExecutor, ThreadedExecutor};
pub use crate::matrix::{Matrix, MatrixStorage};
pub use crate::ring::{Ring, RingJob, rings};
pub use crate::rotator::{RotateTask, Rotator};
