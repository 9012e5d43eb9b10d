//! The possible error types when working with a `DataFrame`, its `Column`s,
//! and the binary and CSV file formats.

use crate::dataframe::DataType;
use thiserror::Error;

/// An enumeration of `DataFrame` errors.
#[derive(Debug, Error)]
pub enum DataFrameError {
    /// A value or column type is incompatible with the requested operation,
    /// including narrowing numeric conversions.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A null value was written to a column or table that does not permit
    /// null values.
    #[error("null value not permitted in column '{column}'")]
    NullabilityViolation { column: String },

    /// A row or column index was beyond the logical length.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A column name is already in use, or is empty.
    #[error("duplicate or invalid column name '{0}'")]
    DuplicateColumnName(String),

    /// The binary representation of a `DataFrame` is invalid.
    #[error("malformed file: {0}")]
    MalformedFile(String),

    /// Column lengths, modes or shapes are inconsistent with each other.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No column with the given name exists.
    #[error("no column named '{0}'")]
    ColumnNotFound(String),

    /// A caller supplied argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A numeric transformation produced a value that does not fit in the
    /// column type.
    #[error("arithmetic overflow in column '{column}' at row {row}")]
    Overflow { column: String, row: usize },

    #[error("invalid regular expression")]
    InvalidRegex(#[from] regex::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),
}

/// A convenient alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, DataFrameError>;

impl DataFrameError {
    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        DataFrameError::IndexOutOfBounds { index, len }
    }

    pub(crate) fn unexpected_type(
        column: &str,
        expected: DataType,
        found: impl std::fmt::Display,
    ) -> Self {
        DataFrameError::TypeMismatch(format!(
            "column '{}': expected {}, found {}",
            column, expected, found
        ))
    }
}
