//! Unified error handling.
//!
//! Only configuration problems surface as errors. Empty neighbourhoods,
//! trajectories without stops and degenerate input are ordinary outcomes of
//! segmentation and are never reported here.

use thiserror::Error;

/// Errors raised before or around a segmentation run.
#[derive(Debug, Error)]
pub enum SegmentationError {
    /// A required column is absent from the input table.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// A column exists but holds the wrong kind of values.
    #[error("column '{column}' must be {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Two sequences or columns that must line up have different lengths.
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A threshold is negative, NaN or infinite.
    #[error("invalid {name}: {value} (must be finite and non-negative)")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// A trip point has no matching row in the table it is mapped back onto.
    #[error("trip {trip_id} of object '{object_id}' has no matching table row")]
    UnmappedTrip { trip_id: u64, object_id: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SegmentationError>;

/// Convenience conversions from `Option` into configuration errors.
pub trait OptionExt<T> {
    /// Turn `None` into [`SegmentationError::MissingColumn`].
    fn ok_or_missing_column(self, column: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_column(self, column: &str) -> Result<T> {
        self.ok_or_else(|| SegmentationError::MissingColumn {
            column: column.to_string(),
        })
    }
}
