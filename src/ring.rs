//! Ring decomposition of a square matrix.
//!
//! An `n x n` matrix splits into `n / 2` concentric rings, like an onion.
//! Ring `level` is the border of the sub-square spanning rows and columns
//! `level..=n - 1 - level`:
//!
//! ```text
//! 4x4: levels     5x5: levels
//! 0 0 0 0         0 0 0 0 0
//! 0 1 1 0         0 1 1 1 0
//! 0 1 1 0         0 1 . 1 0
//! 0 0 0 0         0 1 1 1 0
//!                 0 0 0 0 0
//! ```
//!
//! For odd `n` the center cell belongs to no ring and never moves. Rings
//! share no cells, so each one can be rotated on its own, concurrently with
//! the others.

use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::rotator::MATRIX_PARAMETER;

/// One concentric ring of a square matrix. Describes geometry only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ring {
    side: usize,
    level: usize,
}

impl Ring {
    /// Returns ring `level` of an `side x side` matrix, or `None` if the
    /// matrix has no such ring.
    pub fn new(side: usize, level: usize) -> Option<Self> {
        (level < side / 2).then_some(Self { side, level })
    }

    /// Nesting depth, 0 for the outermost ring.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Side length of the matrix this ring belongs to.
    pub fn side(&self) -> usize {
        self.side
    }

    /// First row/column index covered by the ring.
    pub fn begin(&self) -> usize {
        self.level
    }

    /// Last row/column index covered by the ring.
    pub fn end(&self) -> usize {
        self.side - 1 - self.level
    }

    /// Side length of the sub-square bounded by this ring. Always at least 2.
    pub fn count(&self) -> usize {
        self.end() - self.begin() + 1
    }

    /// Number of cells on the ring, which is also the number of one-step
    /// rotations that bring it back to its original arrangement.
    pub fn cycle_length(&self) -> usize {
        4 * (self.count() - 1)
    }

    /// Ring cells as `(row, column)` in clockwise order, starting at the
    /// top-left corner and walking the top edge first.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + use<> {
        let begin = self.begin();
        let end = self.end();
        let edge = self.count() - 1;
        (0..self.cycle_length()).map(move |step| {
            let offset = step % edge;
            match step / edge {
                0 => (begin, begin + offset),
                1 => (begin + offset, end),
                2 => (end, end - offset),
                _ => (end - offset, begin),
            }
        })
    }
}

/// Iterates over every ring of a `side x side` matrix, outermost first.
pub fn rings(side: usize) -> impl ExactSizeIterator<Item = Ring> {
    (0..side / 2).map(move |level| Ring { side, level })
}

/// Exclusive handle to the cells of one ring of a borrowed matrix.
///
/// Jobs are created in one batch per rotation, one per ring, from a single
/// mutable borrow of the matrix. Since rings are disjoint, no two jobs touch
/// the same cell, and a job can be sent to another thread and consumed there
/// independently of the rest.
pub struct RingJob<'a, T> {
    ring: Ring,
    base: NonNull<T>,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: a job only ever accesses cells of its own ring, and at most one job
// exists per ring for the duration of the borrow, so moving it to another
// thread is equivalent to sending a `&mut` to those cells.
unsafe impl<T: Send> Send for RingJob<'_, T> {}

impl<'a, T> RingJob<'a, T> {
    /// Splits a square matrix into one job per ring, outermost first.
    ///
    /// Fails with [`Error::ShapeMismatch`] if `matrix` is not square. The
    /// pointer arithmetic in [`rotate`](Self::rotate) relies on this check.
    pub(crate) fn split(matrix: &'a mut Matrix<T>) -> Result<Vec<Self>> {
        if !matrix.is_square() {
            return Err(Error::ShapeMismatch {
                parameter: MATRIX_PARAMETER,
                rows: matrix.rows(),
                columns: matrix.columns(),
            });
        }
        let side = matrix.rows();
        let base = NonNull::from(matrix.as_mut_slice()).cast::<T>();
        Ok(rings(side)
            .map(|ring| Self {
                ring,
                base,
                _marker: PhantomData,
            })
            .collect())
    }

    /// The ring this job rotates.
    pub fn ring(&self) -> Ring {
        self.ring
    }

    /// Rotates the ring one step clockwise.
    ///
    /// Every cell takes the value of its counter-clockwise neighbour. The
    /// edges are shifted left, bottom, right, top, in that order, so each
    /// cell is read before it is overwritten; the top-left corner is parked
    /// in a temporary and lands one step to its right at the end. Elements
    /// are moved bitwise: nothing is cloned or dropped.
    pub fn rotate(self) {
        let begin = self.ring.begin();
        let end = self.ring.end();
        let count = self.ring.count();

        // SAFETY: every (row, column) below lies on `self.ring`, inside the
        // square matrix this job was split from. Each `shift` copies between
        // two distinct cells. The sequence reads each cell exactly once
        // before overwriting it, and the final write refills the last cell
        // read, so every element is initialized again when this returns.
        unsafe {
            let temp = ptr::read(self.cell(begin, begin));

            for i in 0..count - 1 {
                self.shift((begin + i + 1, begin), (begin + i, begin));
            }
            for i in 0..count - 1 {
                self.shift((end, begin + i + 1), (end, begin + i));
            }
            for i in 0..count - 1 {
                self.shift((end - i - 1, end), (end - i, end));
            }
            for i in 0..count - 2 {
                self.shift((begin, end - i - 1), (begin, end - i));
            }

            ptr::write(self.cell(begin, begin + 1), temp);
        }
    }

    #[inline(always)]
    fn cell(&self, row: usize, column: usize) -> *mut T {
        let index = row * self.ring.side() + column;
        // SAFETY: callers pass ring coordinates, which are in bounds.
        unsafe { self.base.as_ptr().add(index) }
    }

    #[inline(always)]
    unsafe fn shift(&self, from: (usize, usize), to: (usize, usize)) {
        unsafe { ptr::copy_nonoverlapping(self.cell(from.0, from.1), self.cell(to.0, to.1), 1) };
    }
}

impl<T> std::fmt::Debug for RingJob<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingJob").field("ring", &self.ring).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_bounds() {
        assert_eq!(Ring::new(0, 0), None);
        assert_eq!(Ring::new(1, 0), None);
        assert_eq!(Ring::new(5, 2), None);

        let ring = Ring::new(5, 1).expect("ring");
        assert_eq!(ring.begin(), 1);
        assert_eq!(ring.end(), 3);
        assert_eq!(ring.count(), 3);
        assert_eq!(ring.cycle_length(), 8);
    }

    #[test]
    fn test_rings_count() {
        assert_eq!(rings(0).len(), 0);
        assert_eq!(rings(1).len(), 0);
        assert_eq!(rings(2).len(), 1);
        assert_eq!(rings(7).len(), 3);
        assert_eq!(rings(8).map(|r| r.level()).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cells_clockwise() {
        let ring = Ring::new(3, 0).expect("ring");
        let cells: Vec<_> = ring.cells().collect();
        assert_eq!(
            cells,
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (2, 2),
                (2, 1),
                (2, 0),
                (1, 0)
            ]
        );
    }

    #[test]
    fn test_rings_partition_matrix() {
        for side in 0..9 {
            let mut seen = vec![0u8; side * side];
            for ring in rings(side) {
                for (row, column) in ring.cells() {
                    seen[row * side + column] += 1;
                }
            }
            let center = (side % 2 == 1).then(|| (side / 2) * side + side / 2);
            for (index, hits) in seen.iter().enumerate() {
                let expected = if Some(index) == center { 0 } else { 1 };
                assert_eq!(*hits, expected, "side {side}, cell {index}");
            }
        }
    }

    #[test]
    fn test_split_one_job_per_ring() {
        let mut matrix = Matrix::filled(6, 6, 0u8);
        let jobs = RingJob::split(&mut matrix).expect("square");
        let levels: Vec<_> = jobs.iter().map(|job| job.ring().level()).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn test_split_rejects_non_square() {
        let mut matrix = Matrix::filled(64, 1, 0u8);
        let err = RingJob::split(&mut matrix).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                parameter: "matrix",
                rows: 64,
                columns: 1
            }
        );
    }

    #[test]
    fn test_rotate_inner_ring_only() {
        let mut matrix = Matrix::from([
            [1, 2, 3, 4],
            [12, 13, 14, 5],
            [11, 16, 15, 6],
            [10, 9, 8, 7],
        ]);
        let mut jobs = RingJob::split(&mut matrix).expect("square");
        let inner = jobs.pop().expect("inner ring");
        inner.rotate();
        drop(jobs);

        assert_eq!(
            matrix,
            Matrix::from([
                [1, 2, 3, 4],
                [12, 16, 13, 5],
                [11, 15, 14, 6],
                [10, 9, 8, 7],
            ])
        );
    }

    #[test]
    fn test_rotate_moves_owned_values() {
        let mut matrix = Matrix::from_fn(3, 3, |row, column| format!("{row}{column}"));
        for job in RingJob::split(&mut matrix).expect("square") {
            job.rotate();
        }
        assert_eq!(matrix.row(0), &["10", "00", "01"]);
        assert_eq!(matrix.row(1), &["20", "11", "02"]);
        assert_eq!(matrix.row(2), &["21", "22", "12"]);
    }
}
