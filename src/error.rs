//! Error types for trueno-strip operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in trueno-strip operations.
///
/// Every model operation validates its arguments before touching any state,
/// so an `Err` always means nothing was mutated.
#[derive(Error, Debug)]
pub enum Error {
    /// The cursor has not been advanced onto a row, or has detached.
    #[error("cursor is invalid")]
    InvalidCursor,

    /// Column index outside the configured series.
    #[error("column {index} out of range: table has {count} series")]
    ColumnOutOfRange {
        /// Requested column.
        index: usize,
        /// Number of series.
        count: usize,
    },

    /// Row index outside the stored samples.
    #[error("row {index} out of range: column holds {len} samples")]
    RowOutOfRange {
        /// Requested row.
        index: usize,
        /// Number of stored samples.
        len: usize,
    },

    /// Aggregate query on a column with no samples.
    #[error("no samples in column")]
    EmptySource,

    /// Wrong number of values supplied for one row.
    #[error("value count mismatch: expected {expected} values, got {actual}")]
    ValueCountMismatch {
        /// Number of series in the table.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Setting a bound would violate `value_min < value_max`.
    #[error("invalid bounds: value_min {min} must be less than value_max {max}")]
    BoundsOrder {
        /// Proposed or current minimum.
        min: f64,
        /// Proposed or current maximum.
        max: f64,
    },

    /// Ring buffer capacity must be positive.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(usize),

    /// Display timespan must be positive.
    #[error("invalid timespan: {0} us")]
    InvalidTimespan(i64),

    /// Scale domain is empty or inverted.
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Invalid dimensions for a framebuffer or chart.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),
}
