//! Error type shared by matrix construction, rotator construction and rotation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The matrix to rotate was absent.
    #[error("Parameter \"{parameter}\" can't be null.")]
    NullMatrix { parameter: &'static str },

    /// The matrix to rotate is not square.
    #[error(
        "Parameter \"{parameter}\" must have the same number of columns and rows, but it has {rows} rows and {columns} columns."
    )]
    ShapeMismatch {
        parameter: &'static str,
        rows: usize,
        columns: usize,
    },

    /// A flat buffer does not hold exactly `rows * columns` elements.
    #[error("matrix data has {len} elements, expected {rows} rows x {columns} columns")]
    DataLength {
        rows: usize,
        columns: usize,
        len: usize,
    },

    /// A nested row has a different length than the first row.
    #[error("row {row} has {actual} elements, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A ring worker thread panicked before finishing its rings.
    #[error("ring worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// A background rotation was requested outside a tokio runtime.
    #[error("no tokio runtime to run the rotation on: {0}")]
    NoRuntime(String),

    /// The background rotation task was cancelled or panicked.
    #[error("rotation task failed: {0}")]
    TaskJoin(String),
}
