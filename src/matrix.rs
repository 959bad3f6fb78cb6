//! Dense matrix with row-major element storage.
//!
//! # Memory Layout
//!
//! Elements are stored in one flat buffer in row-major order:
//!
//! ```text
//! data[row * columns + column]
//! ```
//!
//! Rows and columns are fixed once a matrix is built. Nothing on [`Matrix`]
//! reshapes it, which is what lets a [`Rotator`](crate::Rotator) check the
//! shape once at construction and rely on it afterwards.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::error::{Error, Result};

/// A 2D grid of `T` stored as a flat buffer in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl<T> Matrix<T> {
    /// Creates an empty 0x0 matrix.
    pub fn new_empty() -> Self {
        Self {
            rows: 0,
            columns: 0,
            data: Vec::new(),
        }
    }

    /// Creates a matrix with every element set to `value`.
    pub fn filled(rows: usize, columns: usize, value: T) -> Self
    where
        T: Clone,
    {
        let len = rows.saturating_mul(columns);
        Self {
            rows,
            columns,
            data: vec![value; len],
        }
    }

    /// Creates a matrix whose element at `(row, column)` is `f(row, column)`.
    pub fn from_fn<F>(rows: usize, columns: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows.saturating_mul(columns));
        for row in 0..rows {
            for column in 0..columns {
                data.push(f(row, column));
            }
        }
        Self {
            rows,
            columns,
            data,
        }
    }

    /// Wraps a row-major buffer. Fails if `data.len() != rows * columns`.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<T>) -> Result<Self> {
        if rows.checked_mul(columns) != Some(data.len()) {
            return Err(Error::DataLength {
                rows,
                columns,
                len: data.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            data,
        })
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    ///
    /// An empty outer vector yields a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let row_count = rows.len();
        let columns = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(row_count.saturating_mul(columns));
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns {
                return Err(Error::RaggedRow {
                    row: index,
                    expected: columns,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: row_count,
            columns,
            data,
        })
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// Returns the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element at `(row, column)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        if row < self.rows && column < self.columns {
            self.data.get(row * self.columns + column)
        } else {
            None
        }
    }

    /// Returns the element at `(row, column)` mutably, or `None` when out of bounds.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut T> {
        if row < self.rows && column < self.columns {
            self.data.get_mut(row * self.columns + column)
        } else {
            None
        }
    }

    /// Returns the elements of `row`.
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.columns;
        let end = start + self.columns;
        &self.data[start..end]
    }

    /// Returns mutable elements of `row`.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.columns;
        let end = start + self.columns;
        &mut self.data[start..end]
    }

    /// Iterates over rows from top to bottom.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |row| self.row(row))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable view of the element buffer. The shape cannot change through it.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the matrix and returns its row-major buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Copies the matrix into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for Matrix<T> {
    fn from(rows: [[T; C]; R]) -> Self {
        let data = rows.into_iter().flatten().collect();
        Self {
            rows: R,
            columns: C,
            data,
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, column): (usize, usize)) -> &T {
        assert!(
            row < self.rows && column < self.columns,
            "index ({row}, {column}) out of bounds for {}x{} matrix",
            self.rows,
            self.columns
        );
        &self.data[row * self.columns + column]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut T {
        assert!(
            row < self.rows && column < self.columns,
            "index ({row}, {column}) out of bounds for {}x{} matrix",
            self.rows,
            self.columns
        );
        &mut self.data[row * self.columns + column]
    }
}

impl<'a, T> IntoIterator for &'a Matrix<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Rows joined by newlines, elements within a row joined by single spaces.
impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.iter_rows().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for (column, value) in row.iter().enumerate() {
                if column > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

/// Storage a [`Rotator`](crate::Rotator) can rotate in place.
///
/// Implemented for owned matrices, boxed matrices and mutable borrows, so the
/// caller decides whether the rotator borrows the grid or carries it (the
/// latter is what [`Rotator::rotate_async`](crate::Rotator::rotate_async)
/// needs). None of the implementations copy elements.
///
/// [`matrix`](Self::matrix) is what the rotator validates at construction;
/// each rotation checks the shape of [`matrix_mut`](Self::matrix_mut) again
/// and fails with [`Error::ShapeMismatch`] if it is no longer square.
pub trait MatrixStorage {
    type Elem;

    fn matrix(&self) -> &Matrix<Self::Elem>;

    fn matrix_mut(&mut self) -> &mut Matrix<Self::Elem>;
}

impl<T> MatrixStorage for Matrix<T> {
    type Elem = T;

    fn matrix(&self) -> &Matrix<T> {
        self
    }

    fn matrix_mut(&mut self) -> &mut Matrix<T> {
        self
    }
}

impl<T> MatrixStorage for &mut Matrix<T> {
    type Elem = T;

    fn matrix(&self) -> &Matrix<T> {
        self
    }

    fn matrix_mut(&mut self) -> &mut Matrix<T> {
        self
    }
}

impl<T> MatrixStorage for Box<Matrix<T>> {
    type Elem = T;

    fn matrix(&self) -> &Matrix<T> {
        self
    }

    fn matrix_mut(&mut self) -> &mut Matrix<T> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_layout() {
        let matrix = Matrix::from_fn(2, 3, |row, column| row * 10 + column);
        assert_eq!(matrix.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(matrix.row(1), &[10, 11, 12]);
        assert_eq!(matrix[(1, 2)], 12);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = Matrix::from_vec(2, 2, vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::DataLength {
                rows: 2,
                columns: 2,
                len: 3
            }
        );
    }

    #[test]
    fn test_from_vec_rejects_overflowing_shape() {
        let err = Matrix::<u8>::from_vec(usize::MAX, 2, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::DataLength { len: 0, .. }));
    }

    fn set_through_storage<M: MatrixStorage<Elem = i32>>(storage: &mut M, row: usize, value: i32) {
        storage.matrix_mut()[(row, row)] = value;
    }

    #[test]
    fn test_storage_impls_see_same_matrix() {
        let mut matrix = Matrix::from([[1, 2], [3, 4]]);
        {
            let mut borrowed = &mut matrix;
            set_through_storage(&mut borrowed, 0, 9);
        }
        let mut boxed = Box::new(matrix);
        set_through_storage(&mut boxed, 1, 7);
        assert_eq!(MatrixStorage::matrix(&boxed).as_slice(), &[9, 2, 3, 7]);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let matrix = Matrix::from([[1, 2, 3]]);
        let _ = matrix[(0, 3)];
    }
}
