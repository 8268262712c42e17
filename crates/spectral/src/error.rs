//! Error types for the ccew-spectral crate.

use ccew_grid::GridError;

/// Error type for all fallible operations in the ccew-spectral crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectralError {
    /// Returned when a segment length is zero or the overlap leaves no hop.
    #[error("invalid segmenting: length {length}, overlap {overlap}")]
    InvalidSegmenting {
        /// Segment length in samples.
        length: usize,
        /// Overlap in samples.
        overlap: usize,
    },

    /// Returned when a configuration value lies outside its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when the record is shorter than one segment.
    #[error("series too short: got {len} samples, need at least {min}")]
    SeriesTooShort {
        /// Number of time samples provided.
        len: usize,
        /// Minimum number required.
        min: usize,
    },

    /// Returned when rows that must share a shape do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Returned when no segment satisfies the missing-data policy.
    #[error("missing data exceeded in all {segments} segment(s) (threshold {threshold})")]
    MissingDataExceeded {
        /// Number of segments examined.
        segments: usize,
        /// Maximum tolerated missing fraction.
        threshold: f64,
    },

    /// Returned when a computation produces non-finite or non-physical values.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Wrapped error from field selection.
    #[error(transparent)]
    Grid(#[from] GridError),
}
